//! Backend profile
//!
//! The literal strings the emitter writes for sections, the entry point,
//! the return opcode and the working registers. The default targets 32-bit
//! GNU `as`; a profile file can override any subset of the keys.
//!
//! # File format
//!
//! ```text
//! # comment
//! entry_label = _start
//! primary_register = %eax
//! ```

use std::fmt;
use std::str::FromStr;

const DEFAULT_DATA_SECTION: &str = ".data";
const DEFAULT_BSS_SECTION: &str = ".bss";
const DEFAULT_TEXT_SECTION: &str = ".text";
const DEFAULT_ENTRY_LABEL: &str = "main";
const DEFAULT_RETURN_OPCODE: &str = "ret";
const DEFAULT_PRIMARY_REGISTER: &str = "%eax";
const DEFAULT_SECONDARY_REGISTER: &str = "%ebx";
const DEFAULT_REMAINDER_CLEAR: &str = "xorl %edx, %edx";

/// Literal strings used when rendering instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendProfile {
    pub data_section: String,
    pub bss_section: String,
    pub text_section: String,
    pub entry_label: String,
    pub return_opcode: String,
    pub primary_register: String,
    pub secondary_register: String,
    pub remainder_clear: String,
}

impl Default for BackendProfile {
    fn default() -> Self {
        BackendProfile {
            data_section: DEFAULT_DATA_SECTION.to_string(),
            bss_section: DEFAULT_BSS_SECTION.to_string(),
            text_section: DEFAULT_TEXT_SECTION.to_string(),
            entry_label: DEFAULT_ENTRY_LABEL.to_string(),
            return_opcode: DEFAULT_RETURN_OPCODE.to_string(),
            primary_register: DEFAULT_PRIMARY_REGISTER.to_string(),
            secondary_register: DEFAULT_SECONDARY_REGISTER.to_string(),
            remainder_clear: DEFAULT_REMAINDER_CLEAR.to_string(),
        }
    }
}

impl BackendProfile {
    /// Override one key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ProfileError> {
        let slot = match key {
            "data_section" => &mut self.data_section,
            "bss_section" => &mut self.bss_section,
            "text_section" => &mut self.text_section,
            "entry_label" => &mut self.entry_label,
            "return_opcode" => &mut self.return_opcode,
            "primary_register" => &mut self.primary_register,
            "secondary_register" => &mut self.secondary_register,
            "remainder_clear" => &mut self.remainder_clear,
            _ => {
                return Err(ProfileError {
                    line: 0,
                    message: format!("unknown key '{}'", key),
                })
            }
        };
        *slot = value.to_string();
        Ok(())
    }
}

/// Problem in a profile file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ProfileError {}

impl FromStr for BackendProfile {
    type Err = ProfileError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut profile = BackendProfile::default();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }

            let Some((key, value)) = content.split_once('=') else {
                return Err(ProfileError {
                    line,
                    message: format!("expected 'key = value', found '{}'", content),
                });
            };
            let (key, value) = (key.trim(), value.trim());
            if value.is_empty() {
                return Err(ProfileError {
                    line,
                    message: format!("empty value for '{}'", key),
                });
            }

            profile
                .set(key, value)
                .map_err(|err| ProfileError { line, ..err })?;
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = BackendProfile::default();
        assert_eq!(profile.entry_label, "main");
        assert_eq!(profile.primary_register, "%eax");
        assert_eq!(profile.remainder_clear, "xorl %edx, %edx");
    }

    #[test]
    fn test_partial_override() {
        let profile: BackendProfile = "# custom entry\n\nentry_label = _start  # linker entry\n"
            .parse()
            .unwrap();
        assert_eq!(profile.entry_label, "_start");
        assert_eq!(profile.text_section, ".text");
    }

    #[test]
    fn test_value_may_contain_spaces() {
        let profile: BackendProfile = "remainder_clear = movl $0, %edx".parse().unwrap();
        assert_eq!(profile.remainder_clear, "movl $0, %edx");
    }

    #[test]
    fn test_unknown_key_reports_line() {
        let err = "entry_label = main\nstack_register = %esp"
            .parse::<BackendProfile>()
            .unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("stack_register"));
    }

    #[test]
    fn test_line_without_equals() {
        let err = "entry_label main".parse::<BackendProfile>().unwrap_err();
        assert_eq!(err.line, 1);
    }
}
