//! Register identifier spaces.
//!
//! Each architecture gets a closed enumeration whose discriminants are the
//! stable numeric tags used on the byte-oriented API. Sub-register views
//! (AL, AX, EAX, RAX) are distinct tags; the accessors decide which storage
//! they alias.

/// Declare a register enumeration.
///
/// Discriminants are assigned in declaration order starting at zero, so the
/// list order is part of the public numbering and must only ever be appended to.
macro_rules! register_ids {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $text:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        $vis enum $name {
            $($variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn from_u32(id: u32) -> Option<Self> {
                Self::ALL.get(id as usize).copied()
            }

            /// Lowercase assembler name.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),*
                }
            }

            /// Case-insensitive lookup by assembler name.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|reg| reg.name().eq_ignore_ascii_case(name))
            }

            pub fn id(self) -> u32 {
                self as u32
            }
        }

        impl From<$name> for u32 {
            fn from(reg: $name) -> u32 {
                reg as u32
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub(crate) use register_ids;

/// Shift a contiguous family member (`base + n`) back to `n`, if `id` falls
/// inside the `count` tags starting at `base`.
pub(crate) fn family_index<R: Into<u32>>(id: u32, base: R, count: usize) -> Option<usize> {
    let base = base.into();
    let offset = id.checked_sub(base)? as usize;
    (offset < count).then_some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    register_ids! {
        enum Toy {
            Invalid = "invalid",
            A = "a",
            B0 = "b0",
            B1 = "b1",
            B2 = "b2",
        }
    }

    #[test]
    fn numbering_follows_declaration_order() {
        assert_eq!(Toy::B1.id(), 3);
        assert_eq!(Toy::from_u32(2), Some(Toy::B0));
        assert_eq!(Toy::from_u32(5), None);
        assert_eq!(Toy::from_name("B2"), Some(Toy::B2));
    }

    #[test]
    fn family_offsets() {
        assert_eq!(family_index(Toy::B2.id(), Toy::B0, 3), Some(2));
        assert_eq!(family_index(Toy::A.id(), Toy::B0, 3), None);
        assert_eq!(family_index(Toy::B2.id() + 1, Toy::B0, 3), None);
    }
}
