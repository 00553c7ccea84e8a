use serde::de::DeserializeOwned;

/// Slice out the first balanced `{...}` object in `raw`, skipping code fences
/// and any prose the model wrapped around it.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strict parse of a model reply into `T`. The reply must contain exactly one
/// JSON object that deserializes cleanly; anything else is an error.
pub fn parse_strict_json<T: DeserializeOwned>(raw: &str) -> anyhow::Result<T> {
    let object = extract_json_object(raw)
        .ok_or_else(|| anyhow::anyhow!("no JSON object in model output"))?;
    let parsed = serde_json::from_str(object)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        risk: String,
        suggest: bool,
    }

    #[test]
    fn extracts_object_inside_code_fence() {
        let raw = "```json\n{\"risk\":\"high\",\"suggest\":true}\n```";
        assert_eq!(
            extract_json_object(raw),
            Some("{\"risk\":\"high\",\"suggest\":true}")
        );
    }

    #[test]
    fn braces_inside_strings_do_not_close_object() {
        let raw = r#"note: {"risk":"a } b","suggest":false} trailing"#;
        let v: Verdict = parse_strict_json(raw).unwrap();
        assert_eq!(v.risk, "a } b");
        assert!(!v.suggest);
    }

    #[test]
    fn missing_object_is_error() {
        assert!(parse_strict_json::<Verdict>("high risk, yes").is_err());
    }

    #[test]
    fn unbalanced_object_is_error() {
        assert!(parse_strict_json::<Verdict>("{\"risk\":\"high\"").is_err());
    }

    #[test]
    fn wrong_shape_is_error() {
        assert!(parse_strict_json::<Verdict>("{\"risk\":3}").is_err());
    }
}
