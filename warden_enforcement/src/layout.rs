use crate::Punishment;

use chrono::{DateTime, Duration, Utc};

/// Template used when no layout is configured
pub const DEFAULT_DENIAL_TEMPLATE: &str = "You are banned: %REASON%\nExpires: %TIME_REMAINING%";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Renders a punishment into the message shown to a refused player.
///
/// The template may refer to `%TYPE%`, `%REASON%`, `%OPERATOR%`,
/// `%START_DATE%`, `%END_DATE%` and `%TIME_REMAINING%`. Anything else between
/// percent signs is left as written. Substitution is a single pass, so text
/// coming from the punishment itself is never expanded again.
#[derive(Debug, Clone)]
pub struct DenialLayout {
    template: String,
}

impl Default for DenialLayout {
    fn default() -> Self {
        Self::new(DEFAULT_DENIAL_TEMPLATE)
    }
}

impl DenialLayout {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn render(&self, punishment: &Punishment, now: DateTime<Utc>) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let substitution = after.find('%').and_then(|end| {
                variable(&after[..end], punishment, now).map(|value| (end, value))
            });

            match substitution {
                Some((end, value)) => {
                    out.push_str(&value);
                    rest = &after[end + 1..];
                }
                None => {
                    out.push('%');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

fn variable(name: &str, punishment: &Punishment, now: DateTime<Utc>) -> Option<String> {
    let value = match name {
        "TYPE" => punishment.kind.to_string(),
        "REASON" => punishment.reason.clone(),
        "OPERATOR" => punishment.operator.clone(),
        "START_DATE" => punishment.start.format(DATE_FORMAT).to_string(),
        "END_DATE" => match punishment.end {
            Some(end) => end.format(DATE_FORMAT).to_string(),
            None => "Never".to_string(),
        },
        "TIME_REMAINING" => match punishment.end {
            Some(end) => format_remaining(end - now),
            None => "Permanent".to_string(),
        },
        _ => return None,
    };
    Some(value)
}

/// `1d 4h 0m`, `3h 12m`, `45m`; leading zero units are dropped and anything
/// already expired is `0m`
fn format_remaining(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes().max(0);
    let days = total_minutes / (24 * 60);
    let hours = total_minutes / 60 % 24;
    let minutes = total_minutes % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
