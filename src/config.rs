//! Input loading and validation.
//!
//! This module handles:
//! - Loading profile.json and checking the required identity fields
//! - Injecting the outing date/time given on the command line
//! - Reading the certificate template
//! - Naming and writing the generated certificate

use log::debug;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{CertificateError, Result};
use crate::payload::OutingTime;

/// Profile as stored on disk. Fields are optional so that missing keys are
/// reported together instead of as a generic JSON error.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub lieunaissance: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
}

/// Validated identity data plus the runtime outing date/time.
#[derive(Debug, Clone)]
pub struct Profile {
    pub lastname: String,
    pub firstname: String,
    pub birthday: String,
    pub lieunaissance: String,
    pub address: String,
    pub zipcode: String,
    pub town: String,
    pub datesortie: String,
    pub heuresortie: OutingTime,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    pub fn full_address(&self) -> String {
        format!("{} {} {}", self.address, self.zipcode, self.town)
    }
}

impl ProfileRecord {
    /// Check required fields and attach the outing date/time.
    pub fn into_profile(self, datesortie: String, heuresortie: &str) -> Result<Profile> {
        let mut missing = Vec::new();
        let mut take = |value: Option<String>, name: &'static str| match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let lastname = take(self.lastname, "lastname");
        let firstname = take(self.firstname, "firstname");
        let birthday = take(self.birthday, "birthday");
        let lieunaissance = take(self.lieunaissance, "lieunaissance");
        let address = take(self.address, "address");
        let zipcode = take(self.zipcode, "zipcode");
        let town = take(self.town, "town");
        let datesortie = take(Some(datesortie), "datesortie");

        if !missing.is_empty() {
            return Err(CertificateError::ProfileField(missing));
        }

        Ok(Profile {
            lastname,
            firstname,
            birthday,
            lieunaissance,
            address,
            zipcode,
            town,
            datesortie,
            heuresortie: OutingTime::parse(heuresortie)?,
        })
    }
}

fn profile_read_error(path: &Path, source: impl std::error::Error + Send + Sync + 'static) -> CertificateError {
    CertificateError::ProfileRead {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

pub fn load_profile_record(path: &Path) -> Result<ProfileRecord> {
    let file = File::open(path).map_err(|e| profile_read_error(path, e))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| profile_read_error(path, e))
}

pub fn load_template(path: &Path) -> Result<Vec<u8>> {
    let template_read_error = |source| CertificateError::TemplateRead {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(template_read_error)?;
    let mut buf = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut buf)
        .map_err(template_read_error)?;
    debug!("Read {} bytes of template from {:?}", buf.len(), path);
    Ok(buf)
}

/// `certificate-<lastname>-<time>-<reasons>.pdf` in the working directory
pub fn default_output_path(lastname: &str, time: &str, reasons: &str) -> PathBuf {
    let name = format!("certificate-{}-{}-{}.pdf", lastname, time, reasons);
    PathBuf::from(name.replace(['/', '\\'], "_"))
}

pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| CertificateError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
