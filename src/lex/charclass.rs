// byte classes shared by the driver and the language plugins
//
// '\n' is not a space: the driver consumes it separately to keep track of
// the line number

const SPACE: u8  = 0b0000_0001;
const ALPHA: u8  = 0b0000_0010;
const DIGIT: u8  = 0b0000_0100;
const XDIGIT: u8 = 0b0000_1000;
const ODIGIT: u8 = 0b0001_0000;
const BDIGIT: u8 = 0b0010_0000;
const ASM_ID: u8 = 0b0100_0000;

const CLASS_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let c = i as u8;
        let mut flags = 0u8;

        if matches!(c, b' ' | b'\x0c' | b'\r' | b'\t' | b'\x0b') {
            flags |= SPACE;
        }

        if matches!(c, b'a'..=b'z' | b'A'..=b'Z' | b'_') {
            flags |= ALPHA | ASM_ID;
        }

        if matches!(c, b'0'..=b'9') {
            flags |= DIGIT | XDIGIT;
        }

        if matches!(c, b'a'..=b'f' | b'A'..=b'F') {
            flags |= XDIGIT;
        }

        if matches!(c, b'0'..=b'7') {
            flags |= ODIGIT;
        }

        if matches!(c, b'0' | b'1') {
            flags |= BDIGIT;
        }

        if matches!(c, b'@' | b'?') {
            flags |= ASM_ID;
        }

        table[i] = flags;
        i += 1;
    }

    table
};

#[inline]
const fn has(c: u8, class: u8) -> bool {
    CLASS_TABLE[c as usize] & class != 0
}

#[inline]
pub const fn is_space(c: u8) -> bool {
    has(c, SPACE)
}

#[inline]
pub const fn is_alpha(c: u8) -> bool {
    has(c, ALPHA)
}

#[inline]
pub const fn is_digit(c: u8) -> bool {
    has(c, DIGIT)
}

#[inline]
pub const fn is_alnum(c: u8) -> bool {
    has(c, ALPHA | DIGIT)
}

#[inline]
pub const fn is_xdigit(c: u8) -> bool {
    has(c, XDIGIT)
}

#[inline]
pub const fn is_odigit(c: u8) -> bool {
    has(c, ODIGIT)
}

#[inline]
pub const fn is_bdigit(c: u8) -> bool {
    has(c, BDIGIT)
}

/// Letters, `_`, `@` and `?`.
#[inline]
pub const fn is_asm_id_start(c: u8) -> bool {
    has(c, ASM_ID)
}

#[inline]
pub const fn is_asm_id_continue(c: u8) -> bool {
    has(c, ASM_ID | DIGIT)
}

#[inline]
pub const fn is_print(c: u8) -> bool {
    c >= 0x20 && c < 0x7f
}
