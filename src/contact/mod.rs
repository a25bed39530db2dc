//! Contact-information mining
//!
//! [`ContactInfoMiner`] crawls a site's contact, about and legal pages and
//! gathers emails, phone numbers, postal-address candidates, social profile
//! links and descriptive text into a [`ContactEvidence`] record.

mod classifier;
mod miner;
mod normalize;

pub use classifier::{EstablishmentClassifier, KeywordClassifier};
pub use miner::{
    AboutPage, ContactEvidence, ContactInfoMiner, ContactLinkPolicy, CONTACT_PATH_HINTS,
    DEFAULT_MAX_CONTACT_PAGES,
};
pub use normalize::{normalize_email, normalize_phone, MIN_PHONE_DIGITS};
