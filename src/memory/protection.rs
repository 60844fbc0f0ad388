// Tue Jan 13 2026 - Alex

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protection {
    #[default]
    None = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
    Execute = 4,
    ReadExecute = 5,
    WriteExecute = 6,
    ReadWriteExecute = 7,
}

impl Protection {
    pub fn from_flags(flags: u32) -> Self {
        match flags & 7 {
            1 => Self::Read,
            2 => Self::Write,
            3 => Self::ReadWrite,
            4 => Self::Execute,
            5 => Self::ReadExecute,
            6 => Self::WriteExecute,
            7 => Self::ReadWriteExecute,
            _ => Self::None,
        }
    }

    /// Parses the permission column of a maps line, e.g. `rw-p`.
    pub fn from_perms(perms: &str) -> Self {
        let bytes = perms.as_bytes();
        let mut flags = 0;
        if bytes.first() == Some(&b'r') {
            flags |= 1;
        }
        if bytes.get(1) == Some(&b'w') {
            flags |= 2;
        }
        if bytes.get(2) == Some(&b'x') {
            flags |= 4;
        }
        Self::from_flags(flags)
    }

    pub fn to_flags(self) -> u32 {
        self as u32
    }

    pub fn can_read(self) -> bool {
        self.to_flags() & 1 != 0
    }

    pub fn can_write(self) -> bool {
        self.to_flags() & 2 != 0
    }

    pub fn can_execute(self) -> bool {
        self.to_flags() & 4 != 0
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.can_read() { 'r' } else { '-' },
            if self.can_write() { 'w' } else { '-' },
            if self.can_execute() { 'x' } else { '-' },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_perms() {
        assert_eq!(Protection::from_perms("rw-p"), Protection::ReadWrite);
        assert_eq!(Protection::from_perms("r-xp"), Protection::ReadExecute);
        assert_eq!(Protection::from_perms("---p"), Protection::None);
        assert_eq!(Protection::from_perms(""), Protection::None);
    }

    #[test]
    fn test_display_roundtrip() {
        for flags in 0..8 {
            let prot = Protection::from_flags(flags);
            assert_eq!(Protection::from_perms(&prot.to_string()), prot);
        }
    }
}
