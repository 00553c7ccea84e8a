/// Regex alternation of every number word [`parse_number`] understands.
pub const NUMBER_WORD_PATTERN: &str = "a|an|zero|one|two|three|four|five|six|seven|eight|nine|ten|\
eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty|forty|\
fifty|sixty|seventy|eighty|ninety|hundred|thousand|half|dozen";

fn unit_word(word: &str) -> Option<f64> {
    let value = match word {
        "a" | "an" | "one" => 1.0,
        "zero" => 0.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "eleven" => 11.0,
        "twelve" | "dozen" => 12.0,
        "thirteen" => 13.0,
        "fourteen" => 14.0,
        "fifteen" => 15.0,
        "sixteen" => 16.0,
        "seventeen" => 17.0,
        "eighteen" => 18.0,
        "nineteen" => 19.0,
        "twenty" => 20.0,
        "thirty" => 30.0,
        "forty" => 40.0,
        "fifty" => 50.0,
        "sixty" => 60.0,
        "seventy" => 70.0,
        "eighty" => 80.0,
        "ninety" => 90.0,
        "half" => 0.5,
        _ => return None,
    };
    Some(value)
}

/// Parse digits ("2", "2.5", "1,000") or number words ("two", "twenty-five",
/// "a hundred", "half a").
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(|c| *c != ',').collect();
    if let Ok(value) = digits.parse::<f64>() {
        return Some(value);
    }

    let mut total = 0.0;
    let mut current = 0.0;
    let mut seen = false;
    for word in trimmed.split(|c: char| c == '-' || c.is_whitespace()) {
        match word {
            "" | "and" => {}
            "hundred" => {
                current = if current == 0.0 { 100.0 } else { current * 100.0 };
                seen = true;
            }
            "thousand" => {
                total += if current == 0.0 { 1000.0 } else { current * 1000.0 };
                current = 0.0;
                seen = true;
            }
            other => {
                let value = unit_word(other)?;
                // "half a" is 0.5, not 1.5.
                if other == "a" || other == "an" {
                    if current == 0.0 {
                        current = 1.0;
                    }
                } else {
                    current += value;
                }
                seen = true;
            }
        }
    }
    seen.then_some(total + current)
}
