use validator::ValidateEmail;

use crate::api::error;

/// Contact value that asks for the caller's referral link instead of a request.
pub const REFERRAL_LINK_KEYWORD: &str = "referral_link";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact {
    ReferralLink,
    Email(String),
    /// E.164 formatted.
    Phone(String),
}

pub fn parse_contact(raw: &str) -> Result<Contact, error::SystemError> {
    let contact = raw.trim();

    if contact == REFERRAL_LINK_KEYWORD {
        return Ok(Contact::ReferralLink);
    }

    if contact.contains('@') {
        if !contact.validate_email() {
            return Err(error::SystemError::bad_request("Invalid email address"));
        }
        return Ok(Contact::Email(contact.to_string()));
    }

    normalize_phone(contact).map(Contact::Phone)
}

/// Keeps a leading `+` and every digit, so "+7 (912) 345-67-89" becomes "+79123456789".
pub fn phone_digits(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    if raw.starts_with('+') {
        cleaned.push('+');
    }
    cleaned.extend(raw.chars().filter(|c| c.is_ascii_digit()));
    cleaned
}

/// Validates an international number (country code required) and formats it as E.164.
pub fn normalize_phone(raw: &str) -> Result<String, error::SystemError> {
    let cleaned = phone_digits(raw);

    let number = phonenumber::parse(None, &cleaned)
        .map_err(|_| error::SystemError::bad_request("Invalid phone number"))?;

    if !phonenumber::is_valid(&number) {
        return Err(error::SystemError::bad_request("Invalid phone number"));
    }

    Ok(number.format().mode(phonenumber::Mode::E164).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_requests_link() {
        assert_eq!(parse_contact("referral_link").unwrap(), Contact::ReferralLink);
        assert_eq!(parse_contact("  referral_link ").unwrap(), Contact::ReferralLink);
    }

    #[test]
    fn email_contacts() {
        assert_eq!(parse_contact("a@b.com").unwrap(), Contact::Email("a@b.com".to_string()));
        assert!(matches!(parse_contact("not@an@email"), Err(error::SystemError::BadRequest(_))));
        assert!(matches!(parse_contact("@"), Err(error::SystemError::BadRequest(_))));
    }

    #[test]
    fn phone_digits_keeps_only_leading_plus() {
        assert_eq!(phone_digits("+7 (912) 345-67-89"), "+79123456789");
        assert_eq!(phone_digits("8 912 + 345"), "8912345");
    }

    #[test]
    fn phone_contacts_are_formatted_as_e164() {
        assert_eq!(
            parse_contact("+7 (912) 345-67-89").unwrap(),
            Contact::Phone("+79123456789".to_string())
        );
        assert_eq!(normalize_phone("+44 20 7219 3000").unwrap(), "+442072193000");
    }

    #[test]
    fn invalid_phones_are_rejected() {
        assert!(matches!(parse_contact("12ab"), Err(error::SystemError::BadRequest(_))));
        assert!(matches!(parse_contact("hello"), Err(error::SystemError::BadRequest(_))));
        // National format without a country code is not accepted.
        assert!(matches!(parse_contact("89123456789"), Err(error::SystemError::BadRequest(_))));
    }
}
