//! Subject normalization: one corpus detail in, one flat subject row out.

use crate::endings::EndingSet;
use crate::types::{Detail, SubjectRow};

/// Normalize one `(title, detail)` pair into a [`SubjectRow`].
///
/// The caller is responsible for the `detail_type` threshold; this function
/// is a pure mapping and accepts any detail. Steps, in order: strip commas
/// from the text, pick the ordering from the text's last word, decode HTML
/// entities, trim and lowercase. Certain trailing words (prepositions such
/// as "of") read more naturally when the qualifying title follows them, so
/// those texts keep their ending adjacent to the title.
pub fn normalize_subject(title: &str, detail: &Detail, endings: &EndingSet) -> SubjectRow {
    let text = detail.text.replace(',', "");

    let ends_with_special = text
        .split_whitespace()
        .last()
        .is_some_and(|last| endings.contains(last));

    let concatenated = if ends_with_special {
        format!("{text} {title}")
    } else {
        format!("{title} {text}")
    };

    let subject = decode_entities(&concatenated).trim().to_lowercase();
    let links = detail.links.join(" ");
    SubjectRow { subject, links }
}

/// Decode HTML entities: the ASCII named forms, the Latin-1 accented
/// letters, and numeric `&#N;` / `&#xH;` references. Unknown entities pass
/// through unchanged.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail[1..].find(';').map(|i| &tail[1..=i]) {
            // Entity bodies are short and alphanumeric; anything else is a
            // bare ampersand.
            Some(body)
                if body.len() <= 8
                    && body.chars().all(|c| c.is_ascii_alphanumeric() || c == '#') =>
            {
                match decode_entity_body(body) {
                    Some(decoded) => out.push_str(&decoded),
                    None => {
                        out.push('&');
                        out.push_str(body);
                        out.push(';');
                    }
                }
                rest = &tail[body.len() + 2..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity_body(body: &str) -> Option<String> {
    if let Some(c) = named_entity(body) {
        return Some(c.to_string());
    }
    let code = body.strip_prefix('#')?;
    let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse::<u32>().ok()?,
    };
    char::from_u32(value).map(|c| c.to_string())
}

/// Named entities the corpus carries: the HTML core set plus the Latin-1
/// accented letters and ordinal/degree signs.
#[rustfmt::skip]
fn named_entity(body: &str) -> Option<char> {
    Some(match body {
        "amp" => '&', "lt" => '<', "gt" => '>',
        "quot" => '"', "apos" => '\'', "nbsp" => ' ',
        "agrave" => 'à', "aacute" => 'á', "acirc" => 'â', "atilde" => 'ã', "auml" => 'ä', "aring" => 'å',
        "Agrave" => 'À', "Aacute" => 'Á', "Acirc" => 'Â', "Atilde" => 'Ã', "Auml" => 'Ä', "Aring" => 'Å',
        "aelig" => 'æ', "AElig" => 'Æ',
        "ccedil" => 'ç', "Ccedil" => 'Ç',
        "egrave" => 'è', "eacute" => 'é', "ecirc" => 'ê', "euml" => 'ë',
        "Egrave" => 'È', "Eacute" => 'É', "Ecirc" => 'Ê', "Euml" => 'Ë',
        "igrave" => 'ì', "iacute" => 'í', "icirc" => 'î', "iuml" => 'ï',
        "Igrave" => 'Ì', "Iacute" => 'Í', "Icirc" => 'Î', "Iuml" => 'Ï',
        "ntilde" => 'ñ', "Ntilde" => 'Ñ',
        "ograve" => 'ò', "oacute" => 'ó', "ocirc" => 'ô', "otilde" => 'õ', "ouml" => 'ö', "oslash" => 'ø',
        "Ograve" => 'Ò', "Oacute" => 'Ó', "Ocirc" => 'Ô', "Otilde" => 'Õ', "Ouml" => 'Ö', "Oslash" => 'Ø',
        "ugrave" => 'ù', "uacute" => 'ú', "ucirc" => 'û', "uuml" => 'ü',
        "Ugrave" => 'Ù', "Uacute" => 'Ú', "Ucirc" => 'Û', "Uuml" => 'Ü',
        "yacute" => 'ý', "Yacute" => 'Ý', "yuml" => 'ÿ',
        "eth" => 'ð', "ETH" => 'Ð', "thorn" => 'þ', "THORN" => 'Þ', "szlig" => 'ß',
        "ordf" => 'ª', "ordm" => 'º', "deg" => '°',
        _ => return None,
    })
}
