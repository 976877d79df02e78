//! Navigation card grammar (nav.card.v1)
//!
//! Assistant replies may embed navigation cards in a small mini-language:
//!
//! ```text
//! [NAV:quran|surah:2,ayah:255]
//! [NAV:hadith|collection:bukhari,number:1]
//! [NAV:qibla]
//! ```
//!
//! Grammar, versioned as `nav.card.v1`:
//!
//! ```text
//! card   := "[NAV:" type ("|" pairs)? "]"
//! type   := ident
//! pairs  := pair ("," pair)*
//! pair   := ident ":" value
//! value  := any char except "," "|" "]"
//! ```
//!
//! Each card type is a tagged variant with its own field set. The `surah`
//! and `ayah` keys are always distinct; the legacy `number` key on Quran
//! cards is rejected outright rather than silently folded into one of
//! them.

use crate::error::MihrabError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Grammar version accepted by this parser
pub const GRAMMAR_VERSION: &str = "nav.card.v1";

/// One parsed navigation card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavCard {
    /// Open the Quran reader at a surah, optionally scrolled to an ayah
    Quran {
        surah: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        ayah: Option<u16>,
    },
    /// Open a hadith by collection and number
    Hadith { collection: String, number: u32 },
    /// Open prayer times, optionally for a `"<lat>,<lng>"` region
    Prayer {
        #[serde(skip_serializing_if = "Option::is_none")]
        region: Option<String>,
    },
    /// Open the Qibla compass
    Qibla,
    /// Open the Hijri calendar, optionally at a month
    Calendar {
        #[serde(skip_serializing_if = "Option::is_none")]
        hijri_month: Option<u8>,
    },
    /// Open a dua category
    Dua { category: String },
}

/// Result of extracting cards from free-form assistant text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Input text with every well-formed card removed
    pub text: String,
    /// Cards in order of appearance
    pub cards: Vec<NavCard>,
    /// Raw tokens that looked like cards but failed to parse; left in the
    /// text untouched
    pub malformed: Vec<String>,
}

/// Parse a single complete card token, e.g. `[NAV:quran|surah:2]`
pub fn parse_card(token: &str) -> Result<NavCard, MihrabError> {
    let body = token
        .strip_prefix("[NAV:")
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| syntax(token, "expected [NAV:type|k:v,...]"))?;

    let (card_type, pairs_str) = match body.split_once('|') {
        Some((t, p)) => (t, Some(p)),
        None => (body, None),
    };

    if card_type.is_empty() || !card_type.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(syntax(token, "card type must be an identifier"));
    }

    let mut fields: HashMap<&str, &str> = HashMap::new();
    if let Some(pairs_str) = pairs_str {
        for pair in pairs_str.split(',') {
            let (key, value) = pair
                .split_once(':')
                .ok_or_else(|| syntax(token, "expected key:value pair"))?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return Err(syntax(token, "empty key or value"));
            }
            if fields.insert(key, value).is_some() {
                return Err(syntax(token, &format!("duplicate key {:?}", key)));
            }
        }
    }

    build_card(token, card_type, fields)
}

fn build_card(
    token: &str,
    card_type: &str,
    mut fields: HashMap<&str, &str>,
) -> Result<NavCard, MihrabError> {
    let card = match card_type {
        "quran" => {
            if fields.contains_key("number") {
                return Err(syntax(
                    token,
                    "ambiguous key \"number\" on quran cards; use surah and ayah",
                ));
            }
            let surah = require_u16(token, &mut fields, "surah")?;
            let ayah = take_u16(token, &mut fields, "ayah")?;
            NavCard::Quran { surah, ayah }
        }
        "hadith" => {
            let collection = fields
                .remove("collection")
                .ok_or_else(|| syntax(token, "hadith cards require collection"))?
                .to_string();
            let number = fields
                .remove("number")
                .ok_or_else(|| syntax(token, "hadith cards require number"))?
                .parse::<u32>()
                .map_err(|_| syntax(token, "number must be a positive integer"))?;
            NavCard::Hadith { collection, number }
        }
        "prayer" => NavCard::Prayer {
            region: fields.remove("region").map(str::to_string),
        },
        "qibla" => NavCard::Qibla,
        "calendar" => {
            let hijri_month = match fields.remove("hijri_month") {
                Some(raw) => {
                    let month: u8 = raw
                        .parse()
                        .map_err(|_| syntax(token, "hijri_month must be 1-12"))?;
                    if !(1..=12).contains(&month) {
                        return Err(syntax(token, "hijri_month must be 1-12"));
                    }
                    Some(month)
                }
                None => None,
            };
            NavCard::Calendar { hijri_month }
        }
        "dua" => NavCard::Dua {
            category: fields
                .remove("category")
                .ok_or_else(|| syntax(token, "dua cards require category"))?
                .to_string(),
        },
        other => return Err(MihrabError::UnsupportedCard(other.to_string())),
    };

    if let Some(key) = fields.keys().next() {
        return Err(syntax(token, &format!("unknown key {:?}", key)));
    }

    Ok(card)
}

fn require_u16(
    token: &str,
    fields: &mut HashMap<&str, &str>,
    key: &str,
) -> Result<u16, MihrabError> {
    take_u16(token, fields, key)?.ok_or_else(|| syntax(token, &format!("missing key {:?}", key)))
}

fn take_u16(
    token: &str,
    fields: &mut HashMap<&str, &str>,
    key: &str,
) -> Result<Option<u16>, MihrabError> {
    match fields.remove(key) {
        Some(raw) => raw
            .parse::<u16>()
            .map(Some)
            .map_err(|_| syntax(token, &format!("{} must be a positive integer", key))),
        None => Ok(None),
    }
}

fn syntax(token: &str, reason: &str) -> MihrabError {
    MihrabError::CardSyntax(format!("{} in {:?}", reason, token))
}

/// Extract every card from free-form text.
///
/// Lenient by design: assistant output is not trusted to be well formed.
/// Malformed tokens stay in the text and are reported separately; an
/// unterminated `[NAV:` is treated as plain text.
pub fn extract_cards(text: &str) -> Extraction {
    let mut cleaned = String::with_capacity(text.len());
    let mut cards = Vec::new();
    let mut malformed = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("[NAV:") {
        cleaned.push_str(&rest[..start]);
        let tail = &rest[start..];

        match tail.find(']') {
            Some(end) => {
                let token = &tail[..=end];
                match parse_card(token) {
                    Ok(card) => cards.push(card),
                    Err(e) => {
                        log::debug!("leaving malformed navigation card in text: {}", e);
                        malformed.push(token.to_string());
                        cleaned.push_str(token);
                    }
                }
                rest = &tail[end + 1..];
            }
            None => {
                cleaned.push_str(tail);
                rest = "";
            }
        }
    }
    cleaned.push_str(rest);

    Extraction {
        text: cleaned,
        cards,
        malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quran_card_with_ayah() {
        let card = parse_card("[NAV:quran|surah:2,ayah:255]").unwrap();
        assert_eq!(
            card,
            NavCard::Quran {
                surah: 2,
                ayah: Some(255)
            }
        );
    }

    #[test]
    fn test_quran_card_surah_only() {
        let card = parse_card("[NAV:quran|surah:36]").unwrap();
        assert_eq!(
            card,
            NavCard::Quran {
                surah: 36,
                ayah: None
            }
        );
    }

    #[test]
    fn test_quran_rejects_ambiguous_number_key() {
        let err = parse_card("[NAV:quran|number:2]").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_hadith_card_keeps_number_key() {
        let card = parse_card("[NAV:hadith|collection:bukhari,number:6018]").unwrap();
        assert_eq!(
            card,
            NavCard::Hadith {
                collection: "bukhari".to_string(),
                number: 6018
            }
        );
    }

    #[test]
    fn test_bare_card() {
        assert_eq!(parse_card("[NAV:qibla]").unwrap(), NavCard::Qibla);
    }

    #[test]
    fn test_unknown_type() {
        assert!(matches!(
            parse_card("[NAV:zakat]"),
            Err(MihrabError::UnsupportedCard(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_card("[NAV:qibla|foo:bar]").is_err());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        assert!(parse_card("[NAV:quran|surah:2,surah:3]").is_err());
    }

    #[test]
    fn test_calendar_month_range() {
        assert!(parse_card("[NAV:calendar|hijri_month:13]").is_err());
        assert_eq!(
            parse_card("[NAV:calendar|hijri_month:9]").unwrap(),
            NavCard::Calendar {
                hijri_month: Some(9)
            }
        );
    }

    #[test]
    fn test_extract_from_assistant_text() {
        let text = "Ayat al-Kursi is here: [NAV:quran|surah:2,ayah:255] and for \
                    prayer times see [NAV:prayer].";
        let extraction = extract_cards(text);

        assert_eq!(extraction.cards.len(), 2);
        assert_eq!(
            extraction.text,
            "Ayat al-Kursi is here:  and for prayer times see ."
        );
        assert!(extraction.malformed.is_empty());
    }

    #[test]
    fn test_extract_leaves_malformed_in_place() {
        let text = "see [NAV:quran|number:2] for details";
        let extraction = extract_cards(text);

        assert!(extraction.cards.is_empty());
        assert_eq!(extraction.malformed.len(), 1);
        assert_eq!(extraction.text, text);
    }

    #[test]
    fn test_unterminated_card_is_plain_text() {
        let text = "truncated [NAV:quran|surah:2";
        let extraction = extract_cards(text);

        assert!(extraction.cards.is_empty());
        assert_eq!(extraction.text, text);
    }

    #[test]
    fn test_card_json_shape() {
        let card = NavCard::Quran {
            surah: 2,
            ayah: Some(255),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["type"], "quran");
        assert_eq!(json["surah"], 2);
        assert_eq!(json["ayah"], 255);
    }
}
