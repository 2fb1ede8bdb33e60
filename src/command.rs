//! Line commands for the headless driver
//!
//! ```text
//! dates 2024-01-01 2024-01-07     (use - for an open bound)
//! borough Manhattan | borough all
//! zone 161
//! search astoria
//! submenu Brooklyn
//! filter underserved
//! tab congestion
//! toggle
//! close zone | close borough
//! insights
//! report
//! ```

use chrono::NaiveDate;

use crate::chart::ChartTab;
use crate::coordinator::{DashboardEvent, SelectionSource};
use crate::model::{BoroughScope, QuickFilter, ZoneId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command}: {message}")]
    Invalid {
        command: &'static str,
        message: String,
    },
}

fn invalid(command: &'static str, message: impl Into<String>) -> CommandError {
    CommandError::Invalid {
        command,
        message: message.into(),
    }
}

/// Parse one input line; blank lines and `#` comments yield `None`
pub fn parse_command(line: &str) -> Result<Option<DashboardEvent>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let event = match head.to_ascii_lowercase().as_str() {
        "dates" => {
            let mut parts = rest.split_whitespace();
            let start = parse_bound(parts.next())?;
            let end = parse_bound(parts.next())?;
            DashboardEvent::DateRangeChanged { start, end }
        }
        "borough" => {
            if rest.is_empty() {
                return Err(invalid("borough", "expected a borough name or 'all'"));
            }
            DashboardEvent::BoroughSelected(BoroughScope::parse(rest))
        }
        "zone" => {
            let id: u32 = rest
                .parse()
                .map_err(|_| invalid("zone", format!("expected a zone id, got {:?}", rest)))?;
            DashboardEvent::ZoneSelected {
                zone: ZoneId(id),
                source: SelectionSource::Submenu,
            }
        }
        "search" => DashboardEvent::SearchInput(rest.to_string()),
        "submenu" => {
            if rest.is_empty() {
                return Err(invalid("submenu", "expected a borough name"));
            }
            DashboardEvent::SubmenuOpened(rest.to_string())
        }
        "filter" => DashboardEvent::QuickFilterChanged(
            QuickFilter::parse(rest).ok_or_else(|| invalid("filter", "expected all, underserved or normal"))?,
        ),
        "tab" => DashboardEvent::ChartTabChanged(
            ChartTab::parse(rest).ok_or_else(|| invalid("tab", "expected rush-hour or congestion"))?,
        ),
        "toggle" => DashboardEvent::UnderservedToggled,
        "close" => match rest {
            "zone" => DashboardEvent::ZonePanelClosed,
            "borough" => DashboardEvent::BoroughPanelClosed,
            _ => return Err(invalid("close", "expected 'zone' or 'borough'")),
        },
        "insights" => DashboardEvent::InsightsRequested,
        "report" => DashboardEvent::ReportRequested,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(event))
}

fn parse_bound(token: Option<&str>) -> Result<Option<NaiveDate>, CommandError> {
    match token {
        None | Some("-") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| invalid("dates", format!("{}: {}", raw, e))),
    }
}
