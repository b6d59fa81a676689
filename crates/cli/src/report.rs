//! Report rendering: diff-style text tables, the XML summary document, and
//! the one-line stderr summary.

use std::io;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use msgcheck_engine::distance::text;
use msgcheck_engine::summary::FieldStatus;
use msgcheck_engine::{CheckResult, Outcome, Pairing};

// ---------------------------------------------------------------------------
// Text table
// ---------------------------------------------------------------------------

fn caption(pairing: &Pairing) -> &'static str {
    match (pairing.message(), pairing.expectation()) {
        (_, None) => "This Output has no expected",
        (None, Some(e)) if e.check_mode().is_rejection() => "No output for this rejected expected",
        (None, Some(_)) => "No output for this required expected",
        (Some(_), Some(_)) if !pairing.outcome().is_acceptable() => "Output does not match Expected",
        (Some(_), Some(e)) if e.check_mode().is_rejection() => "Rejected Expected matches this Output",
        (Some(_), Some(_)) => "Expected matches this Output",
    }
}

/// Caption line followed by an `Expected` and/or `Output` row.
pub fn render_table(pairing: &Pairing) -> String {
    let comparisons = pairing.field_comparisons();

    let mut header = vec![String::new(), "Time".to_string(), "Name".to_string()];
    header.extend(comparisons.iter().map(|c| c.field.clone()));

    let mut rows = vec![header];
    if let Some(e) = pairing.expectation() {
        let mut row = vec!["Expected".to_string(), e.time().to_string(), e.name().to_string()];
        row.extend(comparisons.iter().map(|c| c.expected.as_ref().map_or_else(|| "-".to_string(), text)));
        rows.push(row);
    }
    if let Some(m) = pairing.message() {
        let mut row = vec!["Output".to_string(), m.time().to_string(), m.name().to_string()];
        row.extend(comparisons.iter().map(|c| match (c.status, &c.observed) {
            (FieldStatus::Absent, _) | (_, None) => "???".to_string(),
            (_, Some(v)) => text(v),
        }));
        rows.push(row);
    }

    let widths: Vec<usize> = (0..rows[0].len())
        .map(|col| rows.iter().map(|r| r[col].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    out.push_str(caption(pairing));
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&pad_row(row, &widths));
        out.push('\n');
        if i == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&pad_row(&rule, &widths));
            out.push('\n');
        }
    }
    out
}

fn pad_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

// ---------------------------------------------------------------------------
// XML
// ---------------------------------------------------------------------------

fn status_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Ok => "MESSAGE MATCHED",
        Outcome::MatchNotFound => "EXPECTED WITHOUT MESSAGE",
        Outcome::MatchError => "MESSAGE NOT MATCHED",
        Outcome::NoExpected => "MESSAGE UNCHECKED",
    }
}

/// Millisecond timestamp as `HH:MM:SS.ffffff` (UTC).
fn clock(ms: f64) -> String {
    let micros = (ms * 1000.0).round();
    if !micros.is_finite() {
        return "-".to_string();
    }
    DateTime::<Utc>::from_timestamp_micros(micros as i64)
        .map(|t| t.format("%H:%M:%S%.6f").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `<Check>` document with one `<Message>` per pairing.
pub fn render_xml(pairings: &[Pairing]) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.create_element("Check").write_inner_content(|w| {
        for p in pairings {
            let (from, to) = p.window().unwrap_or((p.time(), p.time()));
            w.create_element("Message").write_inner_content(|w| {
                w.create_element("Status").write_text_content(BytesText::new(status_label(p.outcome())))?;
                w.create_element("Name").write_text_content(BytesText::new(p.name()))?;
                w.create_element("Interface").write_text_content(BytesText::new("JSON"))?;
                w.create_element("From").write_text_content(BytesText::new(&clock(from)))?;
                w.create_element("To").write_text_content(BytesText::new(&clock(to)))?;
                Ok::<(), io::Error>(())
            })?;
        }
        Ok::<(), io::Error>(())
    })?;

    let mut out = String::from_utf8(writer.into_inner()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    out.push('\n');
    Ok(out)
}

// ---------------------------------------------------------------------------
// Summary line
// ---------------------------------------------------------------------------

pub fn summary_line(result: &CheckResult) -> String {
    let s = &result.summary;
    format!(
        "check {}: {} pairing(s), {} ok, {} mismatched, {} expected without message, {} unchecked message(s)",
        result.verdict, s.total_pairings, s.ok, s.match_error, s.match_not_found, s.no_expected,
    )
}
