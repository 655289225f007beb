use serde::{Deserialize, Serialize};

use crate::models::talent::Talent;

/// One talent whose average moved during a recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub talent: Talent,
    pub old_avg_score: f32,
    pub new_avg_score: f32,
}

impl ScoreChange {
    pub fn diff(&self) -> f32 {
        self.new_avg_score - self.old_avg_score
    }
}

/// Aggregate result of `POST /talents/recalculate-scores`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecalculationSummary {
    pub total_count: usize,
    pub updated_count: usize,
    pub no_change_count: usize,
    pub average_change: f32,
    pub maximum_change: f32,
    pub maximum_talent: Option<Talent>,
    pub score_changes: Vec<ScoreChange>,
}

/// Display values for the talent with the largest change.
#[derive(Debug, Clone, PartialEq)]
pub struct MaximumChangeView {
    pub name: String,
    pub details: String,
    pub old_score: f32,
    pub new_score: f32,
    pub diff: String,
}

impl RecalculationSummary {
    /// Changes ordered by magnitude, largest first.
    pub fn sorted_changes(&self) -> Vec<&ScoreChange> {
        let mut changes: Vec<&ScoreChange> = self.score_changes.iter().collect();
        changes.sort_by(|a, b| b.diff().abs().total_cmp(&a.diff().abs()));
        changes
    }

    pub fn summary(&self) -> String {
        format!(
            "Recalculated {} talent(s): {} updated, {} unchanged",
            self.total_count, self.updated_count, self.no_change_count
        )
    }

    pub fn maximum_change_view(&self) -> Option<MaximumChangeView> {
        let talent = self.maximum_talent.as_ref()?;
        let new_score = talent.average_score.unwrap_or(0.0);
        let details = format!(
            "{} · {}",
            talent.education.as_deref().unwrap_or(""),
            talent.universities.first().map(String::as_str).unwrap_or("")
        );

        Some(MaximumChangeView {
            name: talent.name.clone(),
            details,
            old_score: new_score - self.maximum_change,
            new_score,
            diff: signed(self.maximum_change),
        })
    }
}

/// `+0.5` for gains, `-0.3` for losses, one decimal.
pub fn signed(diff: f32) -> String {
    if diff > 0.0 {
        format!("+{diff:.1}")
    } else {
        format!("{diff:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(name: &str, old: f32, new: f32) -> ScoreChange {
        ScoreChange {
            talent: Talent {
                name: name.to_string(),
                ..Default::default()
            },
            old_avg_score: old,
            new_avg_score: new,
        }
    }

    #[test]
    fn test_sorted_changes_by_magnitude() {
        let summary = RecalculationSummary {
            score_changes: vec![
                change("small", 6.0, 6.2),
                change("drop", 7.0, 5.5),
                change("rise", 5.0, 6.0),
            ],
            ..Default::default()
        };
        let names: Vec<&str> = summary
            .sorted_changes()
            .iter()
            .map(|c| c.talent.name.as_str())
            .collect();
        assert_eq!(names, vec!["drop", "rise", "small"]);
    }

    #[test]
    fn test_maximum_change_view_derives_old_score() {
        let body = r#"{
            "total_count": 3, "updated_count": 1, "no_change_count": 2,
            "average_change": 0.5, "maximum_change": 0.5,
            "maximum_talent": {"phone": 1, "name": "Han Meimei", "education": "Master",
                               "universities": ["Tsinghua"], "averageScore": 7.0},
            "score_changes": []
        }"#;
        let summary: RecalculationSummary = serde_json::from_str(body).unwrap();
        let view = summary.maximum_change_view().unwrap();
        assert_eq!(view.name, "Han Meimei");
        assert_eq!(view.details, "Master · Tsinghua");
        assert!((view.old_score - 6.5).abs() < 1e-6);
        assert_eq!(view.diff, "+0.5");
        assert_eq!(
            summary.summary(),
            "Recalculated 3 talent(s): 1 updated, 2 unchanged"
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let summary: RecalculationSummary = serde_json::from_str("{}").unwrap();
        assert_eq!(summary.total_count, 0);
        assert!(summary.maximum_change_view().is_none());
        assert_eq!(signed(-0.34), "-0.3");
    }
}
