//! Date/time formatting and the QR code payload.
//!
//! The payload string is what a scanner reads back from the QR code, so its
//! field order and labels are an external format. Changing either breaks
//! every verifier that parses it.

use chrono::NaiveDateTime;

use crate::config::Profile;
use crate::error::{CertificateError, Result};

/// Format a timestamp as `dd/mm/yyyy`
pub fn format_date(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%d/%m/%Y").to_string()
}

/// Format a timestamp as `HHhMM`
pub fn format_time(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Hh%M").to_string()
}

/// Outing time split into its hour and minute parts.
///
/// Accepts anything starting with two digits, one separator character and
/// two more digits (`14h37`, `14:37`). Trailing characters are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutingTime {
    pub raw: String,
    pub hour: String,
    pub minute: String,
}

impl OutingTime {
    pub fn parse(raw: &str) -> Result<Self> {
        let chars: Vec<char> = raw.chars().take(5).collect();
        let is_digit_pair = |pair: &[char]| pair.iter().all(|c| c.is_ascii_digit());

        if chars.len() < 5 || !is_digit_pair(&chars[0..2]) || !is_digit_pair(&chars[3..5]) {
            return Err(CertificateError::InvalidOutingTime(raw.to_string()));
        }

        Ok(OutingTime {
            raw: raw.to_string(),
            hour: chars[0..2].iter().collect(),
            minute: chars[3..5].iter().collect(),
        })
    }
}

/// Build the QR payload for a certificate.
///
/// Pure: the same profile, reasons and timestamp always give the same string.
pub fn build_payload(profile: &Profile, reasons: &str, generated_at: &NaiveDateTime) -> String {
    [
        format!(
            "Cree le: {} a {}",
            format_date(generated_at),
            format_time(generated_at)
        ),
        format!("Nom: {}", profile.lastname),
        format!("Prenom: {}", profile.firstname),
        format!("Naissance: {} a {}", profile.birthday, profile.lieunaissance),
        format!(
            "Adresse: {} {} {}",
            profile.address, profile.zipcode, profile.town
        ),
        format!(
            "Sortie: {} a {}h{}",
            profile.datesortie, profile.heuresortie.hour, profile.heuresortie.minute
        ),
        format!("Motifs: {}", reasons),
    ]
    .join(" ")
}
