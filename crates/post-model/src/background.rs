//! Background catalogue.
//!
//! Uploaded image backgrounds take priority. When none exist, posts cycle
//! through the built-in stock photos.

/// Built-in backgrounds, pre-cropped to 1080×1080.
pub const DEFAULT_BACKGROUNDS: [&str; 6] = [
    "https://images.pexels.com/photos/3165335/pexels-photo-3165335.jpeg?auto=compress&cs=tinysrgb&w=1080&h=1080&fit=crop",
    "https://images.pexels.com/photos/1619317/pexels-photo-1619317.jpeg?auto=compress&cs=tinysrgb&w=1080&h=1080&fit=crop",
    "https://images.pexels.com/photos/1029604/pexels-photo-1029604.jpeg?auto=compress&cs=tinysrgb&w=1080&h=1080&fit=crop",
    "https://images.pexels.com/photos/1670187/pexels-photo-1670187.jpeg?auto=compress&cs=tinysrgb&w=1080&h=1080&fit=crop",
    "https://images.pexels.com/photos/1323550/pexels-photo-1323550.jpeg?auto=compress&cs=tinysrgb&w=1080&h=1080&fit=crop",
    "https://images.pexels.com/photos/1906658/pexels-photo-1906658.jpeg?auto=compress&cs=tinysrgb&w=1080&h=1080&fit=crop",
];

/// Background for the post at absolute position `index`.
pub fn background_for_index(uploaded: &[String], index: usize) -> String {
    if uploaded.is_empty() {
        DEFAULT_BACKGROUNDS[index % DEFAULT_BACKGROUNDS.len()].to_string()
    } else {
        uploaded[index % uploaded.len()].clone()
    }
}

/// Every selectable background: uploads first, then the defaults.
pub fn all_backgrounds(uploaded: &[String]) -> Vec<String> {
    uploaded
        .iter()
        .cloned()
        .chain(DEFAULT_BACKGROUNDS.iter().map(|s| s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cycle() {
        assert_eq!(background_for_index(&[], 0), DEFAULT_BACKGROUNDS[0]);
        assert_eq!(background_for_index(&[], 7), DEFAULT_BACKGROUNDS[1]);
    }

    #[test]
    fn test_uploads_take_priority() {
        let uploaded = vec!["data:image/png;base64,A".to_string(), "data:image/png;base64,B".to_string()];
        assert_eq!(background_for_index(&uploaded, 3), uploaded[1]);
    }

    #[test]
    fn test_all_backgrounds_order() {
        let uploaded = vec!["mine.png".to_string()];
        let all = all_backgrounds(&uploaded);
        assert_eq!(all.len(), 7);
        assert_eq!(all[0], "mine.png");
        assert_eq!(all[1], DEFAULT_BACKGROUNDS[0]);
    }
}
