use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use chrono::NaiveTime;
use regex::Regex;
use validator::{validate_url, ValidationError};

use models::{BusinessHours, SocialLink, Weekday};

/// Max number of images a business may carry
pub const MAX_BUSINESS_IMAGES: usize = 5;

fn error(code: &'static str, message: String) -> ValidationError {
    ValidationError {
        code: Cow::from(code),
        message: Some(Cow::from(message)),
        params: HashMap::new(),
    }
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref SLUG_VALIDATION_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
    }

    if SLUG_VALIDATION_RE.is_match(slug) {
        Ok(())
    } else {
        Err(error(
            "slug",
            "Slug may contain lowercase letters, digits and single dashes only".to_string(),
        ))
    }
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref PHONE_VALIDATION_RE: Regex = Regex::new(r"^\+?\d{7,15}$").unwrap();
    }

    let compact = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '(' && *c != ')' && *c != '.')
        .collect::<String>();

    if PHONE_VALIDATION_RE.is_match(&compact) {
        Ok(())
    } else {
        Err(error("phone", "Incorrect phone format".to_string()))
    }
}

pub fn validate_zip_code(zip_code: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref ZIP_VALIDATION_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,9}$").unwrap();
    }

    if ZIP_VALIDATION_RE.is_match(zip_code.trim()) {
        Ok(())
    } else {
        Err(error("zip_code", "Incorrect zip code format".to_string()))
    }
}

/// Parses `HH:MM` wall clock time
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    parse_time(value)
        .map(|_| ())
        .ok_or_else(|| error("time", format!("'{}' is not a HH:MM time", value)))
}

pub fn validate_hours(hours: &[BusinessHours]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for entry in hours {
        if !seen.insert(entry.day) {
            return Err(error("hours", format!("{} is listed more than once", entry.day)));
        }
        if entry.closed {
            continue;
        }
        match (parse_time(&entry.open), parse_time(&entry.close)) {
            (Some(open), Some(close)) => {
                if close <= open {
                    return Err(error("hours", format!("{} closes before it opens", entry.day)));
                }
            }
            _ => return Err(error("hours", format!("{} has invalid opening hours", entry.day))),
        }
    }
    let missing = Weekday::all()
        .iter()
        .filter(|day| !seen.contains(*day))
        .map(|day| day.to_string())
        .collect::<Vec<String>>();
    if !missing.is_empty() {
        return Err(error("hours", format!("Hours are missing for {}", missing.join(", "))));
    }
    Ok(())
}

/// Links with an empty url are allowed here, they are dropped before saving
pub fn validate_social_links(links: &[SocialLink]) -> Result<(), ValidationError> {
    for link in links {
        let url = link.url.trim();
        if url.is_empty() {
            continue;
        }
        if link.platform.trim().is_empty() {
            return Err(error("social_media", format!("Platform is missing for {}", url)));
        }
        if !validate_url(url) {
            return Err(error("social_media", format!("{} link is not a valid url", link.platform)));
        }
    }
    Ok(())
}

pub fn validate_images(images: &[String]) -> Result<(), ValidationError> {
    if images.len() > MAX_BUSINESS_IMAGES {
        return Err(error(
            "images",
            format!("At most {} images are allowed", MAX_BUSINESS_IMAGES),
        ));
    }
    if images
        .iter()
        .any(|image| !(image.starts_with("data:image/") || validate_url(image)))
    {
        return Err(error("images", "Image must be an image data uri or url".to_string()));
    }
    Ok(())
}

/// Options must be non blank and unique
pub fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for option in options {
        if option.trim().is_empty() {
            return Err(error("options", "Option must not be empty".to_string()));
        }
        if !seen.insert(option.as_str()) {
            return Err(error("options", format!("Option '{}' is listed more than once", option)));
        }
    }
    Ok(())
}

/// Builds url-safe slug from arbitrary name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for c in name.trim().chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_alphanumeric() {
            if dash && !slug.is_empty() {
                slug.push('-');
            }
            dash = false;
            slug.push(c);
        } else {
            dash = true;
        }
    }
    slug
}
