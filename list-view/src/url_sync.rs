//! Two-way binding between the society filter and the `society` query
//! parameter. No other filter is addressable through the URL.

use site_common::query::{parse as pairs, serialize};

pub const SOCIETY_PARAM: &str = "society";

/// Decoded, non-empty `society` value of a query string
pub fn society_from_query(query: &str) -> Option<String> {
    pairs(query)
        .into_iter()
        .find(|(key, _)| key == SOCIETY_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Query string (without `?`) that reflects `society`, or `None` if `query`
/// already does.
///
/// A non-empty society replaces the first `society` parameter in place and
/// drops any duplicates. An empty society removes the parameter. All other
/// parameters are kept in order.
pub fn sync_society_param(query: &str, society: &str) -> Option<String> {
    let mut pairs = pairs(query);
    let current = pairs
        .iter()
        .find(|(key, _)| key == SOCIETY_PARAM)
        .map(|(_, value)| value.clone())
        .unwrap_or_default();

    if !society.is_empty() && society != current {
        match pairs.iter().position(|(key, _)| key == SOCIETY_PARAM) {
            Some(first) => {
                pairs[first].1 = society.to_string();
                let mut index = 0;
                pairs.retain(|(key, _)| {
                    let keep = key != SOCIETY_PARAM || index == first;
                    index += 1;
                    keep
                });
            }
            None => pairs.push((SOCIETY_PARAM.to_string(), society.to_string())),
        }
        Some(serialize(&pairs))
    } else if society.is_empty() && !current.is_empty() {
        pairs.retain(|(key, _)| key != SOCIETY_PARAM);
        Some(serialize(&pairs))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_percent_encoded_society() {
        assert_eq!(
            society_from_query("?society=Computer%20Society"),
            Some("Computer Society".to_string())
        );
        assert_eq!(
            society_from_query("page=2&society=Women+in+Engineering"),
            Some("Women in Engineering".to_string())
        );
        assert_eq!(society_from_query("?society="), None);
        assert_eq!(society_from_query(""), None);
    }

    #[test]
    fn sets_param_when_filter_changes() {
        assert_eq!(
            sync_society_param("", "Photonics Society"),
            Some("society=Photonics+Society".to_string())
        );
        assert_eq!(
            sync_society_param("?ref=nav&society=Computer+Society", "Photonics Society"),
            Some("ref=nav&society=Photonics+Society".to_string())
        );
    }

    #[test]
    fn drops_duplicate_params() {
        assert_eq!(
            sync_society_param("society=A&x=1&society=B", "C"),
            Some("society=C&x=1".to_string())
        );
    }

    #[test]
    fn removes_param_when_filter_cleared() {
        assert_eq!(
            sync_society_param("?society=Computer+Society&ref=nav", ""),
            Some("ref=nav".to_string())
        );
        assert_eq!(
            sync_society_param("society=Computer+Society", ""),
            Some(String::new())
        );
    }

    #[test]
    fn leaves_url_alone_when_in_sync() {
        assert_eq!(sync_society_param("society=Computer%20Society", "Computer Society"), None);
        assert_eq!(sync_society_param("ref=nav", ""), None);
    }
}
