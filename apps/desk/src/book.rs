use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::Talent;

/// In-memory copy of the talent list. Replaced wholesale on every list load
/// and patched in place after point mutations (note save, reparse).
#[derive(Clone, Default)]
pub struct TalentBook {
    talents: Arc<RwLock<Vec<Talent>>>,
}

impl TalentBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace_all(&self, talents: Vec<Talent>) {
        let mut guard = self.talents.write().await;
        *guard = talents;
        debug!("Talent book refreshed with {} entries", guard.len());
    }

    pub async fn get(&self, phone: &str) -> Option<Talent> {
        let guard = self.talents.read().await;
        guard.iter().find(|t| t.phone == phone).cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.talents.read().await.len()
    }

    /// Records a confirmed note save. Returns false if the talent is not cached.
    pub async fn patch_interview_record(&self, phone: &str, content: &str) -> bool {
        let mut guard = self.talents.write().await;
        match guard.iter_mut().find(|t| t.phone == phone) {
            Some(talent) => {
                talent.interview_record = content.to_string();
                true
            }
            None => false,
        }
    }

    /// Swaps in a fresh server copy of one talent (after a reparse).
    pub async fn replace(&self, talent: Talent) -> bool {
        let mut guard = self.talents.write().await;
        match guard.iter_mut().find(|t| t.phone == talent.phone) {
            Some(slot) => {
                *slot = talent;
                true
            }
            None => false,
        }
    }

    pub async fn snapshot(&self) -> Vec<Talent> {
        self.talents.read().await.clone()
    }

    /// Highest average first; unscored talents sink to the bottom.
    pub async fn sorted_by_score(&self) -> Vec<Talent> {
        let mut talents = self.snapshot().await;
        talents.sort_by(|a, b| {
            let a = a.average().unwrap_or(f32::NEG_INFINITY);
            let b = b.average().unwrap_or(f32::NEG_INFINITY);
            b.total_cmp(&a)
        });
        talents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn talent(phone: &str, score: Option<f32>) -> Talent {
        Talent {
            phone: phone.to_string(),
            name: format!("talent-{phone}"),
            average_score: score,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_patch_interview_record_updates_only_matching_entry() {
        let book = TalentBook::new();
        book.replace_all(vec![talent("1", None), talent("2", None)])
            .await;

        assert!(book.patch_interview_record("2", "good fit").await);
        assert!(!book.patch_interview_record("3", "nobody").await);

        assert_eq!(book.get("2").await.unwrap().interview_record, "good fit");
        assert_eq!(book.get("1").await.unwrap().interview_record, "");
    }

    #[tokio::test]
    async fn test_replace_swaps_whole_record() {
        let book = TalentBook::new();
        book.replace_all(vec![talent("1", Some(5.0))]).await;

        let mut fresh = talent("1", Some(8.0));
        fresh.name = "Reparsed".to_string();
        assert!(book.replace(fresh).await);
        assert_eq!(book.get("1").await.unwrap().name, "Reparsed");
        assert!(!book.replace(talent("9", None)).await);
        assert_eq!(book.len().await, 1);
    }

    #[tokio::test]
    async fn test_sorted_by_score_puts_unscored_last() {
        let book = TalentBook::new();
        book.replace_all(vec![
            talent("a", Some(5.5)),
            talent("b", None),
            talent("c", Some(7.2)),
            talent("d", Some(0.0)),
        ])
        .await;

        let order: Vec<String> = book
            .sorted_by_score()
            .await
            .into_iter()
            .map(|t| t.phone)
            .collect();
        assert_eq!(order[..2], ["c".to_string(), "a".to_string()]);
        assert!(order[2..].contains(&"b".to_string()));
        assert!(order[2..].contains(&"d".to_string()));
    }
}
