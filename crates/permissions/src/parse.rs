use std::str::FromStr;

use super::known::KnownPermission;
use super::mask::PermissionMask;
use super::ParseMaskError;

impl FromStr for PermissionMask {
    type Err = ParseMaskError;

    /// Parses the textual forms accepted in configuration files.
    ///
    /// - decimal bits (`31`, `0`)
    /// - the keywords `all` and `none`
    /// - compact letters (`rucds`, `rw`, `-` for none)
    /// - names separated by `|`, `+` or `,` (`read|write`)
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseMaskError::Empty);
        }

        if trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            let bits = trimmed
                .parse::<u32>()
                .map_err(|_| ParseMaskError::Invalid(trimmed.to_owned()))?;
            return Self::try_from(bits);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "all" => return Ok(Self::ALL),
            "none" | "-" => return Ok(Self::NONE),
            _ => {}
        }

        if trimmed.contains(['|', '+', ',']) {
            return trimmed
                .split(['|', '+', ','])
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    KnownPermission::from_name(name)
                        .map(KnownPermission::as_mask)
                        .ok_or_else(|| ParseMaskError::Invalid(name.to_owned()))
                })
                .collect();
        }

        if let Some(permission) = KnownPermission::from_name(trimmed) {
            return Ok(permission.as_mask());
        }

        trimmed
            .chars()
            .filter(|letter| *letter != '-')
            .map(|letter| {
                KnownPermission::from_letter(letter)
                    .map(KnownPermission::as_mask)
                    .ok_or(ParseMaskError::UnknownLetter(letter))
            })
            .collect()
    }
}

impl PermissionMask {
    /// Renders the compact letter form, using `-` for unset bits (`r-c--`).
    #[must_use]
    pub fn to_letters(self) -> String {
        KnownPermission::ALL
            .iter()
            .map(|permission| {
                if self.contains(permission.as_mask()) {
                    permission.letter()
                } else {
                    '-'
                }
            })
            .collect()
    }
}
