use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Gold,
    Silver,
    Bronze,
    Participant,
}

pub fn badge_for(percentage: i64) -> Badge {
    match percentage {
        90.. => Badge::Gold,
        75..=89 => Badge::Silver,
        50..=74 => Badge::Bronze,
        _ => Badge::Participant,
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Badge::Gold => "gold",
            Badge::Silver => "silver",
            Badge::Bronze => "bronze",
            Badge::Participant => "participant",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_percentage_boundaries() {
        assert_eq!(badge_for(100), Badge::Gold);
        assert_eq!(badge_for(90), Badge::Gold);
        assert_eq!(badge_for(89), Badge::Silver);
        assert_eq!(badge_for(75), Badge::Silver);
        assert_eq!(badge_for(74), Badge::Bronze);
        assert_eq!(badge_for(50), Badge::Bronze);
        assert_eq!(badge_for(49), Badge::Participant);
        assert_eq!(badge_for(0), Badge::Participant);
    }

    #[test]
    fn displays_lowercase_label() {
        assert_eq!(Badge::Silver.to_string(), "silver");
    }
}
