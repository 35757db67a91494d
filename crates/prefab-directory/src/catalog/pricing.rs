use serde::Serialize;

/// Dollar bounds parsed out of a free-form price string such as `"$150,000 - $220,000"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl PriceRange {
    /// Extracts the first two amounts. When the text contains a `$`, only `$`-prefixed numbers count,
    /// so `"Starting at $180k (2 bed)"` ignores the bedroom count.
    pub fn parse(text: &str) -> Option<Self> {
        let dollar_only = text.contains('$');
        let chars: Vec<char> = text.chars().collect();
        let mut amounts = Vec::with_capacity(2);
        let mut index = 0;

        while index < chars.len() && amounts.len() < 2 {
            if !chars[index].is_ascii_digit() {
                index += 1;
                continue;
            }

            let prefixed = index > 0 && chars[index - 1] == '$';
            let (amount, next) = read_amount(&chars, index);
            index = next;

            if dollar_only && !prefixed {
                continue;
            }
            if let Some(amount) = amount {
                amounts.push(amount);
            }
        }

        match amounts.as_slice() {
            [] => None,
            [single] => Some(Self {
                min: *single,
                max: None,
            }),
            [first, second, ..] => Some(Self {
                min: (*first).min(*second),
                max: Some((*first).max(*second)),
            }),
        }
    }

    pub fn upper(&self) -> u64 {
        self.max.unwrap_or(self.min)
    }
}

fn read_amount(chars: &[char], start: usize) -> (Option<u64>, usize) {
    let mut whole = String::new();
    let mut fraction = String::new();
    let mut in_fraction = false;
    let mut index = start;

    while let Some(&ch) = chars.get(index) {
        let next_is_digit = chars.get(index + 1).is_some_and(char::is_ascii_digit);
        if ch.is_ascii_digit() {
            if in_fraction {
                fraction.push(ch);
            } else {
                whole.push(ch);
            }
        } else if ch == ',' && !in_fraction && next_is_digit {
            // thousands separator
        } else if ch == '.' && !in_fraction && next_is_digit {
            in_fraction = true;
        } else {
            break;
        }
        index += 1;
    }

    let suffix_ends_word = !chars
        .get(index + 1)
        .is_some_and(|ch| ch.is_ascii_alphabetic());
    let multiplier = match chars.get(index) {
        Some('k' | 'K') if suffix_ends_word => {
            index += 1;
            1_000.0
        }
        Some('m' | 'M') if suffix_ends_word => {
            index += 1;
            1_000_000.0
        }
        _ => 1.0,
    };

    let literal = if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    };

    let amount = literal
        .parse::<f64>()
        .ok()
        .map(|value| (value * multiplier).round() as u64);

    (amount, index)
}
