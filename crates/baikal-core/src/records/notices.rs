use crate::error::Result;
use crate::models::Notice;
use crate::records::RecordsApi;

/// Split into `(pinned, regular)`, each keeping server order.
pub fn partition_pinned(notices: &[Notice]) -> (Vec<&Notice>, Vec<&Notice>) {
    notices.iter().partition(|n| n.is_pinned)
}

pub async fn load(api: &dyn RecordsApi) -> Result<Vec<Notice>> {
    api.list_notices().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(id: &str, pinned: bool) -> Notice {
        Notice {
            id: id.to_string(),
            title: format!("공지 {id}"),
            content: String::new(),
            is_pinned: pinned,
            author: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_partition_keeps_order() {
        let items = vec![notice("1", false), notice("2", true), notice("3", false), notice("4", true)];
        let (pinned, regular) = partition_pinned(&items);
        let ids = |v: &[&Notice]| v.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&pinned), vec!["2", "4"]);
        assert_eq!(ids(&regular), vec!["1", "3"]);
    }
}
