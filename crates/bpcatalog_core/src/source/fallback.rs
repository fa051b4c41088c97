//! Built-in minimal dataset.
//!
//! Served when the canonical dataset cannot be fetched so the catalog is
//! never empty.

use crate::model::article::ArticleRecord;
use crate::model::field::FieldValue;

/// Returns the fixed fallback dataset, in display order.
pub fn builtin_dataset() -> Vec<ArticleRecord> {
    vec![
        ArticleRecord {
            authors: Some(FieldValue::scalar("Murray Sidman")),
            abstract_text: Some(
                "An experimental analysis of stimulus control and discrimination learning in pigeons."
                    .to_string(),
            ),
            process: Some(FieldValue::scalar("Stimulus Control")),
            pages: Some("1-27".to_string()),
            ..ArticleRecord::new("Stimulus Control and Discrimination Learning", 1960, 3, 1)
        },
        ArticleRecord {
            authors: Some(FieldValue::scalar("Richard J. Herrnstein")),
            abstract_text: Some(
                "A comprehensive review of the matching law and its applications across different species and procedures."
                    .to_string(),
            ),
            process: Some(FieldValue::scalar("Matching Law")),
            static_equation: Some(
                r"\log\left(\frac{B_1}{B_2}\right) = a\log\left(\frac{r_1}{r_2}\right) + \log c"
                    .to_string(),
            ),
            static_definitions: Some(
                "a: sensitivity; c: bias; B_1/B_2: response ratio; r_1/r_2: reinforcement ratio"
                    .to_string(),
            ),
            pages: Some("159-199".to_string()),
            ..ArticleRecord::new("The Matching Law: A Research Review", 1970, 14, 2)
        },
        ArticleRecord {
            authors: Some(FieldValue::list(["Howard Rachlin", "Leonard Green"])),
            abstract_text: Some(
                "An experimental investigation of temporal discounting using a choice procedure with pigeons."
                    .to_string(),
            ),
            process: Some(FieldValue::list(["Positive Reinforcement", "Delay Discounting"])),
            static_equation: Some(r"V = A \cdot e^{-kD}".to_string()),
            static_definitions: Some(
                "V: discounted value; A: amount; k: discount rate; D: delay".to_string(),
            ),
            pages: Some("1-13".to_string()),
            ..ArticleRecord::new("Temporal Discounting in Pigeons", 1972, 17, 1)
        },
        ArticleRecord {
            authors: Some(FieldValue::scalar("George Ainslie")),
            abstract_text: Some(
                "A theoretical analysis of hyperbolic discounting and its implications for self-control."
                    .to_string(),
            ),
            process: Some(FieldValue::list(["Positive Reinforcement", "Delay Discounting"])),
            static_equation: Some(r"V = \frac{A}{1 + kD}".to_string()),
            static_definitions: Some(
                "V: discounted value; A: amount; k: discount rate; D: delay".to_string(),
            ),
            recursive_equation: Some(r"V_{t+1} = V_t - k D V_{t+1}".to_string()),
            recursive_definitions: Some("V_t: value at step t; k: discount rate; D: delay".to_string()),
            pages: Some("67-145".to_string()),
            ..ArticleRecord::new("Hyperbolic Discounting and Self-Control", 1975, 23, 2)
        },
        ArticleRecord {
            authors: Some(FieldValue::scalar("Richard J. Herrnstein")),
            abstract_text: Some(
                "A hyperbolic function describing absolute response rate as a function of reinforcement rate."
                    .to_string(),
            ),
            process: Some(FieldValue::scalar("Positive Reinforcement")),
            static_equation: Some(r"R = \frac{kR_H}{R_H + R_E}".to_string()),
            static_definitions: Some(
                "k: asymptotic response rate; R_H: reinforcement rate; R_E: extraneous reinforcement"
                    .to_string(),
            ),
            ..ArticleRecord::new("On the Law of Effect", 1970, 13, 2)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::builtin_dataset;
    use std::collections::HashSet;

    #[test]
    fn builtin_dataset_is_non_empty_with_unique_keys() {
        let records = builtin_dataset();
        assert!(!records.is_empty());
        let keys = records.iter().map(|r| r.key()).collect::<HashSet<_>>();
        assert_eq!(keys.len(), records.len());
    }
}
