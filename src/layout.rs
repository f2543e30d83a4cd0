//! Fixed geometry of the certificate template.
//!
//! Coordinates are PDF user-space points with the origin at the bottom-left
//! corner of the page, matching the template this tool ships with.

/// Default size for text fields
pub const TEXT_SIZE: f64 = 11.0;

/// A named anchor on the template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    /// Only set for fields whose size is fitted to their box
    pub max_width: Option<f64>,
    pub min_size: f64,
    pub default_size: f64,
}

impl LayoutBox {
    pub const fn at(x: f64, y: f64, size: f64) -> Self {
        LayoutBox {
            x,
            y,
            max_width: None,
            min_size: size,
            default_size: size,
        }
    }

    pub const fn fitted(x: f64, y: f64, max_width: f64, min_size: f64, default_size: f64) -> Self {
        LayoutBox {
            x,
            y,
            max_width: Some(max_width),
            min_size,
            default_size,
        }
    }
}

pub const FULL_NAME: LayoutBox = LayoutBox::at(123.0, 686.0, TEXT_SIZE);
pub const BIRTHDAY: LayoutBox = LayoutBox::at(123.0, 661.0, TEXT_SIZE);
pub const BIRTHPLACE: LayoutBox = LayoutBox::at(92.0, 638.0, TEXT_SIZE);
pub const ADDRESS: LayoutBox = LayoutBox::at(134.0, 613.0, TEXT_SIZE);
pub const TOWN: LayoutBox = LayoutBox::fitted(111.0, 226.0, 83.0, 7.0, TEXT_SIZE);
pub const OUTING_DATE: LayoutBox = LayoutBox::at(92.0, 200.0, TEXT_SIZE);
pub const OUTING_HOUR: LayoutBox = LayoutBox::at(200.0, 201.0, TEXT_SIZE);
pub const OUTING_MINUTE: LayoutBox = LayoutBox::at(220.0, 201.0, TEXT_SIZE);
pub const CREATED_LABEL: LayoutBox = LayoutBox::at(464.0, 150.0, 7.0);
pub const CREATED_VALUE: LayoutBox = LayoutBox::at(455.0, 144.0, 7.0);

pub const CHECKMARK: &str = "x";
const CHECKMARK_SIZE: f64 = 19.0;
const CHECKBOX_X: f64 = 76.0;

/// Image placement: lower-left corner and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// QR thumbnail on the certificate, anchored from the right edge
pub fn qr_thumbnail(page_width: f64) -> ImageBox {
    ImageBox {
        x: page_width - 170.0,
        y: 155.0,
        width: 100.0,
        height: 100.0,
    }
}

/// Enlarged QR code near the top of the second page
pub fn qr_full_page(page_height: f64) -> ImageBox {
    ImageBox {
        x: 50.0,
        y: page_height - 350.0,
        width: 300.0,
        height: 300.0,
    }
}

/// Travel justifications printed on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Travail,
    Courses,
    Sante,
    Famille,
    Sport,
    Judiciaire,
    Missions,
}

impl Reason {
    pub const ALL: [Reason; 7] = [
        Reason::Travail,
        Reason::Courses,
        Reason::Sante,
        Reason::Famille,
        Reason::Sport,
        Reason::Judiciaire,
        Reason::Missions,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Reason::Travail => "travail",
            Reason::Courses => "courses",
            Reason::Sante => "sante",
            Reason::Famille => "famille",
            Reason::Sport => "sport",
            Reason::Judiciaire => "judiciaire",
            Reason::Missions => "missions",
        }
    }

    pub fn checkbox(&self) -> LayoutBox {
        let y = match self {
            Reason::Travail => 527.0,
            Reason::Courses => 478.0,
            Reason::Sante => 436.0,
            Reason::Famille => 400.0,
            Reason::Sport => 345.0,
            Reason::Judiciaire => 298.0,
            Reason::Missions => 260.0,
        };
        LayoutBox::at(CHECKBOX_X, y, CHECKMARK_SIZE)
    }

    /// Reasons whose token occurs anywhere in `reasons`.
    ///
    /// Matching is by substring, so `"travail,courses"`, `"travail courses"`
    /// and `"travailcourses"` all select both. Other words are ignored.
    pub fn selected_in(reasons: &str) -> Vec<Reason> {
        Reason::ALL
            .into_iter()
            .filter(|reason| reasons.contains(reason.token()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_in_combined_reasons() {
        assert_eq!(
            Reason::selected_in("travail,courses"),
            vec![Reason::Travail, Reason::Courses]
        );
    }

    #[test]
    fn test_selected_in_ignores_unknown_words() {
        assert!(Reason::selected_in("promenade").is_empty());
        assert!(Reason::selected_in("").is_empty());
        assert_eq!(Reason::selected_in("sport et plage"), vec![Reason::Sport]);
    }

    #[test]
    fn test_selected_in_matches_substrings() {
        assert_eq!(
            Reason::selected_in("missionsjudiciaire"),
            vec![Reason::Judiciaire, Reason::Missions]
        );
    }

    #[test]
    fn test_checkboxes_are_distinct() {
        let mut ys: Vec<i64> = Reason::ALL.iter().map(|r| r.checkbox().y as i64).collect();
        ys.dedup();
        assert_eq!(ys.len(), Reason::ALL.len());
        assert!(Reason::ALL.iter().all(|r| r.checkbox().x == CHECKBOX_X));
    }

    #[test]
    fn test_qr_boxes() {
        assert_eq!(qr_thumbnail(595.0).x, 425.0);
        assert_eq!(qr_full_page(842.0).y, 492.0);
        assert_eq!(qr_full_page(842.0).width, 300.0);
    }
}
