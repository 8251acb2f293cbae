//! Turns the model's free text into an [`AnalysisResult`].
//!
//! The heuristic is order sensitive and lossy. Line 0 is the artist unless
//! it carries another label, labelled lines fill artist/period/style, and
//! everything from line 2 onward is sliced into sentences for the prose
//! fields. Line 2 is the cutoff whether or not lines 0 and 1 were labels.

use regex::Regex;
use shared::analysis::TECHNIQUE_NOT_AVAILABLE;
use shared::AnalysisResult;
use std::sync::LazyLock;

static ARTIST_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)artist:").expect("valid artist pattern"));
static PERIOD_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)period:|date:").expect("valid period pattern"));
static STYLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)style:|movement:").expect("valid style pattern"));
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s+").expect("valid sentence pattern"));

const BODY_START_LINE: usize = 2;

/// Parse a model response. Never fails; unmatched fields keep defaults.
pub fn parse(raw: &str) -> AnalysisResult {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut result = AnalysisResult::default();

    for (index, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if index == 0 && !lower.contains("artist:") {
            result.artist = line.to_string();
        } else if lower.contains("artist:") {
            result.artist = strip_label(&ARTIST_LABEL, line);
        } else if lower.contains("period:") || lower.contains("date:") {
            result.period = strip_label(&PERIOD_LABEL, line);
        } else if lower.contains("style:") || lower.contains("movement:") {
            result.style = strip_label(&STYLE_LABEL, line);
        }
    }

    let body = lines
        .get(BODY_START_LINE..)
        .unwrap_or_default()
        .join(" ");
    let sentences: Vec<&str> = SENTENCE_BREAK.split(&body).collect();

    if sentences.len() >= 3 {
        result.context = format!("{}.", sentences[..2].join(". "));
        result.meaning = format!("{}.", sentences[2..sentences.len().min(5)].join(". "));
        let technique = sentences
            .get(5..)
            .map(|rest| rest.join(". "))
            .unwrap_or_default();
        result.technique = if technique.is_empty() {
            TECHNIQUE_NOT_AVAILABLE.to_string()
        } else {
            technique
        };
    } else {
        result.context = body;
    }

    result
}

/// Remove the first label match and trim what is left
fn strip_label(label: &Regex, line: &str) -> String {
    label.replace(line, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_all_defaults() {
        let result = parse("");
        assert_eq!(result, AnalysisResult::default());
        assert_eq!(result.context, "");
        assert_eq!(result.meaning, "");
        assert_eq!(result.technique, "");
    }

    #[test]
    fn test_whitespace_only_is_all_defaults() {
        assert_eq!(parse("  \n\t\n   "), AnalysisResult::default());
    }

    #[test]
    fn test_labelled_response_with_sentences() {
        let raw = "Claude Monet\nPeriod: 1870s\nStyle: Impressionism\nThis is sentence one. This is sentence two. This is the meaning part. More meaning. Technique details here.";
        let result = parse(raw);

        assert_eq!(result.artist, "Claude Monet");
        assert_eq!(result.period, "1870s");
        assert_eq!(result.style, "Impressionism");
        // Line 2 (the style line) still opens the body
        assert_eq!(
            result.context,
            "Style: Impressionism This is sentence one. This is sentence two."
        );
        assert_eq!(
            result.meaning,
            "This is the meaning part. More meaning. Technique details here.."
        );
        assert_eq!(result.technique, "Details not available.");
    }

    #[test]
    fn test_technique_takes_sixth_sentence_onward() {
        let raw = "A\nB\nOne. Two. Three. Four. Five. Six. Seven";
        let result = parse(raw);
        assert_eq!(result.context, "One. Two.");
        assert_eq!(result.meaning, "Three. Four. Five.");
        assert_eq!(result.technique, "Six. Seven");
    }

    #[test]
    fn test_two_line_input_has_empty_body() {
        let result = parse("Claude Monet\nPeriod: 1870s");
        assert_eq!(result.artist, "Claude Monet");
        assert_eq!(result.period, "1870s");
        assert_eq!(result.context, "");
        assert_eq!(result.meaning, "");
        assert_eq!(result.technique, "");
    }

    #[test]
    fn test_short_body_goes_to_context_verbatim() {
        let result = parse("Frida Kahlo\n1940s\nA self portrait. Painted in oil.");
        assert_eq!(result.context, "A self portrait. Painted in oil.");
        assert_eq!(result.meaning, "");
        assert_eq!(result.technique, "");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let raw = "ARTIST: Frida Kahlo\nDATE: 1939\nMovement: Surrealism";
        let result = parse(raw);
        assert_eq!(result.artist, "Frida Kahlo");
        assert_eq!(result.period, "1939");
        assert_eq!(result.style, "Surrealism");
    }

    #[test]
    fn test_first_line_wins_even_with_other_label() {
        let result = parse("Period: Baroque\nArtist: Caravaggio");
        assert_eq!(result.artist, "Caravaggio");
        assert_eq!(result.period, "Unknown Period");

        let result = parse("Period: Baroque\nStyle: Tenebrism");
        assert_eq!(result.artist, "Period: Baroque");
        assert_eq!(result.style, "Tenebrism");
    }

    #[test]
    fn test_lines_are_trimmed_and_blank_lines_dropped() {
        let raw = "\n\n   Hokusai   \r\n\r\n  Period: Edo  \n\nThe Great Wave.  Woodblock print. Ukiyo-e.";
        let result = parse(raw);
        assert_eq!(result.artist, "Hokusai");
        assert_eq!(result.period, "Edo");
        assert_eq!(result.context, "The Great Wave. Woodblock print.");
        assert_eq!(result.meaning, "Ukiyo-e..");
    }
}
