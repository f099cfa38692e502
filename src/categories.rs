//! Standard Newznab/Torznab category codes.
//!
//! Top-level categories are multiples of 1000; subcategories add tens to
//! their parent. Trackers may expose private categories above 100000, which
//! are not listed here.

/// One standard category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: u32,
    pub name: &'static str,
}

impl Category {
    const fn new(id: u32, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Returns true for a top-level category.
    pub fn is_parent(&self) -> bool {
        self.id % 1000 == 0
    }

    /// Id of the top-level category this one belongs to.
    pub fn parent_id(&self) -> u32 {
        self.id - self.id % 1000
    }
}

pub const CONSOLE: u32 = 1000;
pub const MOVIES: u32 = 2000;
pub const MOVIES_SD: u32 = 2030;
pub const MOVIES_HD: u32 = 2040;
pub const MOVIES_UHD: u32 = 2045;
pub const MOVIES_BLURAY: u32 = 2050;
pub const AUDIO: u32 = 3000;
pub const AUDIO_MP3: u32 = 3010;
pub const AUDIO_AUDIOBOOK: u32 = 3030;
pub const AUDIO_LOSSLESS: u32 = 3040;
pub const PC: u32 = 4000;
pub const TV: u32 = 5000;
pub const TV_SD: u32 = 5030;
pub const TV_HD: u32 = 5040;
pub const TV_UHD: u32 = 5045;
pub const TV_ANIME: u32 = 5070;
pub const TV_DOCUMENTARY: u32 = 5080;
pub const XXX: u32 = 6000;
pub const BOOKS: u32 = 7000;
pub const BOOKS_EBOOK: u32 = 7020;
pub const BOOKS_COMICS: u32 = 7030;
pub const OTHER: u32 = 8000;

/// The standard category table.
pub static STANDARD: &[Category] = &[
    Category::new(1000, "Console"),
    Category::new(1010, "Console/NDS"),
    Category::new(1020, "Console/PSP"),
    Category::new(1030, "Console/Wii"),
    Category::new(1040, "Console/XBox"),
    Category::new(1050, "Console/XBox 360"),
    Category::new(1080, "Console/PS3"),
    Category::new(1090, "Console/Other"),
    Category::new(1140, "Console/XBox One"),
    Category::new(1150, "Console/PS4"),
    Category::new(1180, "Console/Switch"),
    Category::new(2000, "Movies"),
    Category::new(2010, "Movies/Foreign"),
    Category::new(2020, "Movies/Other"),
    Category::new(2030, "Movies/SD"),
    Category::new(2040, "Movies/HD"),
    Category::new(2045, "Movies/UHD"),
    Category::new(2050, "Movies/BluRay"),
    Category::new(2060, "Movies/3D"),
    Category::new(2070, "Movies/DVD"),
    Category::new(2080, "Movies/WEB-DL"),
    Category::new(3000, "Audio"),
    Category::new(3010, "Audio/MP3"),
    Category::new(3020, "Audio/Video"),
    Category::new(3030, "Audio/Audiobook"),
    Category::new(3040, "Audio/Lossless"),
    Category::new(3050, "Audio/Other"),
    Category::new(3060, "Audio/Foreign"),
    Category::new(4000, "PC"),
    Category::new(4010, "PC/0day"),
    Category::new(4020, "PC/ISO"),
    Category::new(4030, "PC/Mac"),
    Category::new(4040, "PC/Mobile-Other"),
    Category::new(4050, "PC/Games"),
    Category::new(4060, "PC/Mobile-iOS"),
    Category::new(4070, "PC/Mobile-Android"),
    Category::new(5000, "TV"),
    Category::new(5010, "TV/WEB-DL"),
    Category::new(5020, "TV/Foreign"),
    Category::new(5030, "TV/SD"),
    Category::new(5040, "TV/HD"),
    Category::new(5045, "TV/UHD"),
    Category::new(5050, "TV/Other"),
    Category::new(5060, "TV/Sport"),
    Category::new(5070, "TV/Anime"),
    Category::new(5080, "TV/Documentary"),
    Category::new(6000, "XXX"),
    Category::new(6010, "XXX/DVD"),
    Category::new(6020, "XXX/WMV"),
    Category::new(6030, "XXX/XviD"),
    Category::new(6040, "XXX/x264"),
    Category::new(6050, "XXX/Pack"),
    Category::new(6060, "XXX/ImageSet"),
    Category::new(6070, "XXX/Other"),
    Category::new(7000, "Books"),
    Category::new(7010, "Books/Mags"),
    Category::new(7020, "Books/EBook"),
    Category::new(7030, "Books/Comics"),
    Category::new(7040, "Books/Technical"),
    Category::new(7050, "Books/Other"),
    Category::new(7060, "Books/Foreign"),
    Category::new(8000, "Other"),
    Category::new(8010, "Other/Misc"),
    Category::new(8020, "Other/Hashed"),
];

/// Looks up a standard category by id.
pub fn get(id: u32) -> Option<&'static Category> {
    STANDARD.iter().find(|c| c.id == id)
}

/// Looks up a standard category by name, ignoring ASCII case.
pub fn find_by_name(name: &str) -> Option<&'static Category> {
    STANDARD.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Parses a category given either as a numeric id or a standard name.
pub fn parse(value: &str) -> Option<u32> {
    let value = value.trim();
    value
        .parse()
        .ok()
        .or_else(|| find_by_name(value).map(|c| c.id))
}

/// Name of a category id as a string, e.g. `"5040"` -> `"TV/HD"`.
pub fn name_of(id: &str) -> Option<&'static str> {
    id.trim().parse().ok().and_then(get).map(|c| c.name)
}

/// Subcategories of a top-level category.
pub fn subcategories(parent: u32) -> impl Iterator<Item = &'static Category> {
    STANDARD
        .iter()
        .filter(move |c| !c.is_parent() && c.parent_id() == parent)
}
