//! x86 register identifiers.

use crate::regid::register_ids;

register_ids! {
    /// x86 register tags, numbered the way the public API has always numbered them.
    pub enum X86Reg {
        Invalid = "invalid",
        Ah = "ah",
        Al = "al",
        Ax = "ax",
        Bh = "bh",
        Bl = "bl",
        Bp = "bp",
        Bpl = "bpl",
        Bx = "bx",
        Ch = "ch",
        Cl = "cl",
        Cs = "cs",
        Cx = "cx",
        Dh = "dh",
        Di = "di",
        Dil = "dil",
        Dl = "dl",
        Ds = "ds",
        Dx = "dx",
        Eax = "eax",
        Ebp = "ebp",
        Ebx = "ebx",
        Ecx = "ecx",
        Edi = "edi",
        Edx = "edx",
        Eflags = "eflags",
        Eip = "eip",
        Es = "es",
        Esi = "esi",
        Esp = "esp",
        Fpsw = "fpsw",
        Fs = "fs",
        Gs = "gs",
        Ip = "ip",
        Rax = "rax",
        Rbp = "rbp",
        Rbx = "rbx",
        Rcx = "rcx",
        Rdi = "rdi",
        Rdx = "rdx",
        Rip = "rip",
        Rsi = "rsi",
        Rsp = "rsp",
        Si = "si",
        Sil = "sil",
        Sp = "sp",
        Spl = "spl",
        Ss = "ss",
        Cr0 = "cr0",
        Cr1 = "cr1",
        Cr2 = "cr2",
        Cr3 = "cr3",
        Cr4 = "cr4",
        Cr5 = "cr5",
        Cr6 = "cr6",
        Cr7 = "cr7",
        Cr8 = "cr8",
        Cr9 = "cr9",
        Cr10 = "cr10",
        Cr11 = "cr11",
        Cr12 = "cr12",
        Cr13 = "cr13",
        Cr14 = "cr14",
        Cr15 = "cr15",
        Dr0 = "dr0",
        Dr1 = "dr1",
        Dr2 = "dr2",
        Dr3 = "dr3",
        Dr4 = "dr4",
        Dr5 = "dr5",
        Dr6 = "dr6",
        Dr7 = "dr7",
        Dr8 = "dr8",
        Dr9 = "dr9",
        Dr10 = "dr10",
        Dr11 = "dr11",
        Dr12 = "dr12",
        Dr13 = "dr13",
        Dr14 = "dr14",
        Dr15 = "dr15",
        Fp0 = "fp0",
        Fp1 = "fp1",
        Fp2 = "fp2",
        Fp3 = "fp3",
        Fp4 = "fp4",
        Fp5 = "fp5",
        Fp6 = "fp6",
        Fp7 = "fp7",
        K0 = "k0",
        K1 = "k1",
        K2 = "k2",
        K3 = "k3",
        K4 = "k4",
        K5 = "k5",
        K6 = "k6",
        K7 = "k7",
        Mm0 = "mm0",
        Mm1 = "mm1",
        Mm2 = "mm2",
        Mm3 = "mm3",
        Mm4 = "mm4",
        Mm5 = "mm5",
        Mm6 = "mm6",
        Mm7 = "mm7",
        R8 = "r8",
        R9 = "r9",
        R10 = "r10",
        R11 = "r11",
        R12 = "r12",
        R13 = "r13",
        R14 = "r14",
        R15 = "r15",
        St0 = "st0",
        St1 = "st1",
        St2 = "st2",
        St3 = "st3",
        St4 = "st4",
        St5 = "st5",
        St6 = "st6",
        St7 = "st7",
        Xmm0 = "xmm0",
        Xmm1 = "xmm1",
        Xmm2 = "xmm2",
        Xmm3 = "xmm3",
        Xmm4 = "xmm4",
        Xmm5 = "xmm5",
        Xmm6 = "xmm6",
        Xmm7 = "xmm7",
        Xmm8 = "xmm8",
        Xmm9 = "xmm9",
        Xmm10 = "xmm10",
        Xmm11 = "xmm11",
        Xmm12 = "xmm12",
        Xmm13 = "xmm13",
        Xmm14 = "xmm14",
        Xmm15 = "xmm15",
        Xmm16 = "xmm16",
        Xmm17 = "xmm17",
        Xmm18 = "xmm18",
        Xmm19 = "xmm19",
        Xmm20 = "xmm20",
        Xmm21 = "xmm21",
        Xmm22 = "xmm22",
        Xmm23 = "xmm23",
        Xmm24 = "xmm24",
        Xmm25 = "xmm25",
        Xmm26 = "xmm26",
        Xmm27 = "xmm27",
        Xmm28 = "xmm28",
        Xmm29 = "xmm29",
        Xmm30 = "xmm30",
        Xmm31 = "xmm31",
        Ymm0 = "ymm0",
        Ymm1 = "ymm1",
        Ymm2 = "ymm2",
        Ymm3 = "ymm3",
        Ymm4 = "ymm4",
        Ymm5 = "ymm5",
        Ymm6 = "ymm6",
        Ymm7 = "ymm7",
        Ymm8 = "ymm8",
        Ymm9 = "ymm9",
        Ymm10 = "ymm10",
        Ymm11 = "ymm11",
        Ymm12 = "ymm12",
        Ymm13 = "ymm13",
        Ymm14 = "ymm14",
        Ymm15 = "ymm15",
        Ymm16 = "ymm16",
        Ymm17 = "ymm17",
        Ymm18 = "ymm18",
        Ymm19 = "ymm19",
        Ymm20 = "ymm20",
        Ymm21 = "ymm21",
        Ymm22 = "ymm22",
        Ymm23 = "ymm23",
        Ymm24 = "ymm24",
        Ymm25 = "ymm25",
        Ymm26 = "ymm26",
        Ymm27 = "ymm27",
        Ymm28 = "ymm28",
        Ymm29 = "ymm29",
        Ymm30 = "ymm30",
        Ymm31 = "ymm31",
        Zmm0 = "zmm0",
        Zmm1 = "zmm1",
        Zmm2 = "zmm2",
        Zmm3 = "zmm3",
        Zmm4 = "zmm4",
        Zmm5 = "zmm5",
        Zmm6 = "zmm6",
        Zmm7 = "zmm7",
        Zmm8 = "zmm8",
        Zmm9 = "zmm9",
        Zmm10 = "zmm10",
        Zmm11 = "zmm11",
        Zmm12 = "zmm12",
        Zmm13 = "zmm13",
        Zmm14 = "zmm14",
        Zmm15 = "zmm15",
        Zmm16 = "zmm16",
        Zmm17 = "zmm17",
        Zmm18 = "zmm18",
        Zmm19 = "zmm19",
        Zmm20 = "zmm20",
        Zmm21 = "zmm21",
        Zmm22 = "zmm22",
        Zmm23 = "zmm23",
        Zmm24 = "zmm24",
        Zmm25 = "zmm25",
        Zmm26 = "zmm26",
        Zmm27 = "zmm27",
        Zmm28 = "zmm28",
        Zmm29 = "zmm29",
        Zmm30 = "zmm30",
        Zmm31 = "zmm31",
        R8b = "r8b",
        R9b = "r9b",
        R10b = "r10b",
        R11b = "r11b",
        R12b = "r12b",
        R13b = "r13b",
        R14b = "r14b",
        R15b = "r15b",
        R8d = "r8d",
        R9d = "r9d",
        R10d = "r10d",
        R11d = "r11d",
        R12d = "r12d",
        R13d = "r13d",
        R14d = "r14d",
        R15d = "r15d",
        R8w = "r8w",
        R9w = "r9w",
        R10w = "r10w",
        R11w = "r11w",
        R12w = "r12w",
        R13w = "r13w",
        R14w = "r14w",
        R15w = "r15w",
        Idtr = "idtr",
        Gdtr = "gdtr",
        Ldtr = "ldtr",
        Tr = "tr",
        Fpcw = "fpcw",
        Fptag = "fptag",
        Msr = "msr",
        Mxcsr = "mxcsr",
        FsBase = "fs_base",
        GsBase = "gs_base",
        Flags = "flags",
        Rflags = "rflags",
        Fip = "fip",
        Fcs = "fcs",
        Fdp = "fdp",
        Fds = "fds",
        Fop = "fop",
    }
}
