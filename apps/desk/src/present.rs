//! Text rendering of talents, upload reports and recalculation results.

use std::fmt::Write;

use crate::models::recalc::signed;
use crate::models::{BatchUploadReport, RecalculationSummary, Talent};

pub const UNSCORED_COLOR: &str = "#999";

/// Colour band of an average score. Zero counts as unscored.
pub fn score_color(score: Option<f32>) -> &'static str {
    match Talent::scored(score) {
        None => UNSCORED_COLOR,
        Some(s) if s >= 7.0 => "#52c41a",
        Some(s) if s >= 6.0 => "#1890ff",
        Some(s) if s >= 5.0 => "#faad14",
        Some(_) => "#f5222d",
    }
}

pub fn grade(score: Option<f32>) -> Option<&'static str> {
    let s = Talent::scored(score)?;
    Some(match s {
        s if s >= 9.0 => "A+",
        s if s >= 8.0 => "A",
        s if s >= 7.0 => "B+",
        s if s >= 6.0 => "B",
        s if s >= 5.0 => "C+",
        s if s >= 4.0 => "C",
        s if s >= 3.0 => "D",
        _ => "F",
    })
}

pub fn format_score(score: Option<f32>) -> String {
    match Talent::scored(score) {
        Some(s) => format!("{s:.1}"),
        None => "-".to_string(),
    }
}

pub fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

pub fn format_years(years: Option<i32>) -> String {
    match years {
        Some(y) if y > 0 => format!("{y} yrs"),
        _ => "-".to_string(),
    }
}

pub fn format_phone(phone: &str) -> String {
    if phone.is_empty() {
        "-".to_string()
    } else {
        phone.to_string()
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// One grid card.
pub fn talent_card(talent: &Talent) -> String {
    let name = if talent.name.is_empty() {
        "UNKNOWN"
    } else {
        &talent.name
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{name} [{}] {}",
        format_score(talent.average_score),
        score_color(talent.average_score)
    );
    let _ = writeln!(
        out,
        "  {}",
        talent
            .job_position
            .as_deref()
            .filter(|j| !j.is_empty())
            .unwrap_or("No position assigned")
    );
    let _ = writeln!(
        out,
        "  exp {} | edu {} | tech {}",
        format_score(talent.experience_score),
        format_score(talent.education_score),
        format_score(talent.technical_score)
    );
    let _ = write!(
        out,
        "  {} | {} | {} | {}",
        format_phone(&talent.phone),
        or_dash(talent.education.as_deref()),
        or_dash(talent.major.as_deref()),
        format_years(talent.years)
    );
    out
}

/// The detail view, without the note editor and resume viewer.
pub fn talent_detail(talent: &Talent) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", talent.name, format_phone(&talent.phone));
    let _ = writeln!(
        out,
        "Average score: {} {}",
        format_score(talent.average_score),
        grade(talent.average_score).unwrap_or("")
    );
    let _ = writeln!(out, "Position:      {}", or_dash(talent.job_position.as_deref()));
    let _ = writeln!(
        out,
        "Age:           {}",
        talent.age.filter(|a| *a > 0).map_or_else(|| "-".to_string(), |a| a.to_string())
    );
    let _ = writeln!(out, "Email:         {}", or_dash(talent.email.as_deref()));
    let _ = writeln!(out, "Education:     {}", or_dash(talent.education.as_deref()));
    let _ = writeln!(out, "Major:         {}", or_dash(talent.major.as_deref()));
    let _ = writeln!(out, "Experience:    {}", format_years(talent.years));
    let _ = writeln!(out, "Hometown:      {}", or_dash(talent.native.as_deref()));
    let _ = writeln!(
        out,
        "Expected pay:  {}",
        talent
            .expect_salary
            .filter(|s| *s > 0)
            .map_or_else(|| "-".to_string(), |s| s.to_string())
    );
    let _ = writeln!(out, "Skills:        {}", join_or(&talent.skills, "No skill data"));
    let _ = writeln!(
        out,
        "Universities:  {}",
        join_or(&talent.universities, "No university data")
    );
    let _ = writeln!(
        out,
        "Companies:     {}",
        join_or(&talent.companies, "No work history")
    );
    let _ = writeln!(
        out,
        "Cities:        {}",
        join_or(&talent.expect_cities, "No preferred cities")
    );
    if let Some(blog) = talent.blog.as_deref().filter(|b| !b.is_empty()) {
        let _ = writeln!(out, "Blog:          {blog}");
    }
    if let Some(github) = talent.github.as_deref().filter(|g| !g.is_empty()) {
        let _ = writeln!(out, "GitHub:        {github}");
    }
    let _ = write!(
        out,
        "Scores:        exp {} | edu {} | tech {}",
        format_score(talent.experience_score),
        format_score(talent.education_score),
        format_score(talent.technical_score)
    );
    out
}

pub fn upload_report(report: &BatchUploadReport) -> String {
    let mut out = report.summary();
    for ok in &report.results {
        let name = ok.talent.as_ref().map_or("", |t| t.name.as_str());
        let _ = write!(out, "\n  ok        {} {}", ok.filename, name);
    }
    for dup in &report.duplicates {
        let name = dup.existing_talent.as_ref().map_or("", |t| t.name.as_str());
        let _ = write!(out, "\n  duplicate {} {}", dup.filename, name);
    }
    for failed in &report.errors {
        let _ = write!(out, "\n  failed    {}: {}", failed.filename, failed.error);
    }
    out
}

pub fn recalc_report(summary: &RecalculationSummary) -> String {
    let mut out = summary.summary();
    let _ = write!(out, "\nAverage change: {}", signed(summary.average_change));

    if let Some(max) = summary.maximum_change_view() {
        let _ = write!(
            out,
            "\nLargest change: {} ({}) {:.1} -> {:.1} ({})",
            max.name, max.details, max.old_score, max.new_score, max.diff
        );
    }

    for change in summary.sorted_changes() {
        let _ = write!(
            out,
            "\n  {:<12} {:.1} -> {:.1} ({})",
            change.talent.name,
            change.old_avg_score,
            change.new_avg_score,
            signed(change.diff())
        );
    }
    out
}
