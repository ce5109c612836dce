/// Fixed number of rows rendered per list page.
pub const ITEMS_PER_PAGE: u32 = 6;

/// Number of pages needed to show `count` rows; zero rows means zero pages.
pub fn total_pages(count: i64) -> u32 {
    if count <= 0 {
        return 0;
    }
    let per_page = i64::from(ITEMS_PER_PAGE);
    u32::try_from((count + per_page - 1) / per_page).unwrap_or(u32::MAX)
}

/// Parses the `page` query parameter, falling back to the first page.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// Row offset of the first record on `page` (1-based).
pub fn offset(page: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(ITEMS_PER_PAGE)
}

/// One element of the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(u32),
    Ellipsis,
}

/// Builds the sequence of page links shown below a table.
///
/// Short ranges list every page; longer ones keep the first and last pages
/// visible and collapse the rest around the current page.
pub fn generate_pagination(current: u32, total: u32) -> Vec<PageLink> {
    use PageLink::{Ellipsis, Page};

    if total <= 7 {
        return (1..=total).map(Page).collect();
    }
    if current <= 3 {
        return vec![Page(1), Page(2), Page(3), Ellipsis, Page(total - 1), Page(total)];
    }
    if current >= total - 2 {
        return vec![
            Page(1),
            Page(2),
            Ellipsis,
            Page(total - 2),
            Page(total - 1),
            Page(total),
        ];
    }
    vec![
        Page(1),
        Ellipsis,
        Page(current - 1),
        Page(current),
        Page(current + 1),
        Ellipsis,
        Page(total),
    ]
}
