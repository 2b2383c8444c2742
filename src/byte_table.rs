//! Static 256-entry byte classification table (C2).
//!
//! Classification is deterministic from the byte value alone — this
//! module is a lookup artifact, not a runtime policy object.

/// Broad structural category of a byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteCategory {
    Control,
    Whitespace,
    LetterUpper,
    LetterLower,
    Digit,
    Punctuation,
    Utf8Lead2,
    Utf8Lead3,
    Utf8Lead4,
    Utf8Cont,
    Invalid,
}

/// Bonding behaviour a byte participates in (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondClass {
    Alpha,
    Numeric,
    Separator,
    Delimiter,
    Covalent,
    Inert,
    Unstable,
}

#[derive(Debug, Clone)]
pub struct ByteCode {
    pub value: u8,
    pub hex: String,
    pub category: ByteCategory,
    pub bond_class: BondClass,
    pub display: String,
    pub name: String,
    pub ascii_char: Option<char>,
}

fn control_name(v: u8) -> Option<&'static str> {
    Some(match v {
        0x00 => "NULL",
        0x01 => "START OF HEADING",
        0x02 => "START OF TEXT",
        0x03 => "END OF TEXT",
        0x04 => "END OF TRANSMISSION",
        0x05 => "ENQUIRY",
        0x06 => "ACKNOWLEDGE",
        0x07 => "BELL",
        0x08 => "BACKSPACE",
        0x09 => "CHARACTER TABULATION",
        0x0A => "LINE FEED",
        0x0B => "LINE TABULATION",
        0x0C => "FORM FEED",
        0x0D => "CARRIAGE RETURN",
        0x0E => "SHIFT OUT",
        0x0F => "SHIFT IN",
        0x10 => "DATA LINK ESCAPE",
        0x11 => "DEVICE CONTROL ONE",
        0x12 => "DEVICE CONTROL TWO",
        0x13 => "DEVICE CONTROL THREE",
        0x14 => "DEVICE CONTROL FOUR",
        0x15 => "NEGATIVE ACKNOWLEDGE",
        0x16 => "SYNCHRONOUS IDLE",
        0x17 => "END OF TRANSMISSION BLOCK",
        0x18 => "CANCEL",
        0x19 => "END OF MEDIUM",
        0x1A => "SUBSTITUTE",
        0x1B => "ESCAPE",
        0x1C => "INFORMATION SEPARATOR FOUR",
        0x1D => "INFORMATION SEPARATOR THREE",
        0x1E => "INFORMATION SEPARATOR TWO",
        0x1F => "INFORMATION SEPARATOR ONE",
        0x7F => "DELETE",
        _ => return None,
    })
}

fn punct_name(v: u8) -> Option<&'static str> {
    Some(match v {
        0x21 => "EXCLAMATION MARK",
        0x22 => "QUOTATION MARK",
        0x23 => "NUMBER SIGN",
        0x24 => "DOLLAR SIGN",
        0x25 => "PERCENT SIGN",
        0x26 => "AMPERSAND",
        0x27 => "APOSTROPHE",
        0x28 => "LEFT PARENTHESIS",
        0x29 => "RIGHT PARENTHESIS",
        0x2A => "ASTERISK",
        0x2B => "PLUS SIGN",
        0x2C => "COMMA",
        0x2D => "HYPHEN-MINUS",
        0x2E => "FULL STOP",
        0x2F => "SOLIDUS",
        0x3A => "COLON",
        0x3B => "SEMICOLON",
        0x3C => "LESS-THAN SIGN",
        0x3D => "EQUALS SIGN",
        0x3E => "GREATER-THAN SIGN",
        0x3F => "QUESTION MARK",
        0x40 => "COMMERCIAL AT",
        0x5B => "LEFT SQUARE BRACKET",
        0x5C => "REVERSE SOLIDUS",
        0x5D => "RIGHT SQUARE BRACKET",
        0x5E => "CIRCUMFLEX ACCENT",
        0x5F => "LOW LINE",
        0x60 => "GRAVE ACCENT",
        0x7B => "LEFT CURLY BRACKET",
        0x7C => "VERTICAL LINE",
        0x7D => "RIGHT CURLY BRACKET",
        0x7E => "TILDE",
        _ => return None,
    })
}

fn classify_byte(value: u8) -> ByteCode {
    let hex = format!("0x{:02X}", value);

    if matches!(value, 0x09 | 0x0A | 0x0D | 0x20) {
        let name = match value {
            0x09 => "CHARACTER TABULATION",
            0x0A => "LINE FEED",
            0x0D => "CARRIAGE RETURN",
            _ => "SPACE",
        };
        return ByteCode {
            value,
            hex,
            category: ByteCategory::Whitespace,
            bond_class: BondClass::Separator,
            display: format!("{:?}", value as char),
            name: name.to_string(),
            ascii_char: if value == 0x20 { Some(' ') } else { None },
        };
    }

    if let Some(name) = control_name(value) {
        return ByteCode {
            value,
            hex,
            category: ByteCategory::Control,
            bond_class: BondClass::Inert,
            display: format!("<{}>", name),
            name: name.to_string(),
            ascii_char: None,
        };
    }

    if (0x21..=0x7E).contains(&value) {
        let ch = value as char;
        if value.is_ascii_uppercase() {
            return ByteCode {
                value,
                hex,
                category: ByteCategory::LetterUpper,
                bond_class: BondClass::Alpha,
                display: ch.to_string(),
                name: format!("LATIN CAPITAL LETTER {}", ch),
                ascii_char: Some(ch),
            };
        }
        if value.is_ascii_lowercase() {
            return ByteCode {
                value,
                hex,
                category: ByteCategory::LetterLower,
                bond_class: BondClass::Alpha,
                display: ch.to_string(),
                name: format!("LATIN SMALL LETTER {}", ch.to_ascii_uppercase()),
                ascii_char: Some(ch),
            };
        }
        if value.is_ascii_digit() {
            return ByteCode {
                value,
                hex,
                category: ByteCategory::Digit,
                bond_class: BondClass::Numeric,
                display: ch.to_string(),
                name: format!("DIGIT {}", ch),
                ascii_char: Some(ch),
            };
        }
        let name = punct_name(value).unwrap_or("PUNCTUATION").to_string();
        return ByteCode {
            value,
            hex,
            category: ByteCategory::Punctuation,
            bond_class: BondClass::Delimiter,
            display: ch.to_string(),
            name,
            ascii_char: Some(ch),
        };
    }

    if (0x80..=0xBF).contains(&value) {
        return ByteCode {
            value,
            hex,
            category: ByteCategory::Utf8Cont,
            bond_class: BondClass::Covalent,
            display: format!("<CONT {:02}>", value - 0x80),
            name: format!("UTF8 CONTINUATION {}", value - 0x80),
            ascii_char: None,
        };
    }
    if (0xC0..=0xDF).contains(&value) {
        return ByteCode {
            value,
            hex,
            category: ByteCategory::Utf8Lead2,
            bond_class: BondClass::Covalent,
            display: format!("<LEAD2 {:02}>", value - 0xC0),
            name: format!("UTF8 2-BYTE LEAD {}", value - 0xC0),
            ascii_char: None,
        };
    }
    if (0xE0..=0xEF).contains(&value) {
        return ByteCode {
            value,
            hex,
            category: ByteCategory::Utf8Lead3,
            bond_class: BondClass::Covalent,
            display: format!("<LEAD3 {:02}>", value - 0xE0),
            name: format!("UTF8 3-BYTE LEAD {}", value - 0xE0),
            ascii_char: None,
        };
    }
    if (0xF0..=0xF7).contains(&value) {
        return ByteCode {
            value,
            hex,
            category: ByteCategory::Utf8Lead4,
            bond_class: BondClass::Covalent,
            display: format!("<LEAD4 {:02}>", value - 0xF0),
            name: format!("UTF8 4-BYTE LEAD {}", value - 0xF0),
            ascii_char: None,
        };
    }

    ByteCode {
        value,
        hex,
        category: ByteCategory::Invalid,
        bond_class: BondClass::Unstable,
        display: format!("<INVALID {:02X}>", value),
        name: format!("INVALID BYTE 0x{:02X}", value),
        ascii_char: None,
    }
}

/// The complete, deterministically constructed 256-entry table.
pub fn byte_table() -> Vec<ByteCode> {
    (0u16..256).map(|v| classify_byte(v as u8)).collect()
}

pub fn classify(value: u8) -> ByteCode {
    classify_byte(value)
}
