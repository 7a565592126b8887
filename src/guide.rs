// src/guide.rs
use crate::classify::BinCategory;

/// Static presentation data for one bin.
#[derive(Debug)]
pub struct BinInfo {
    pub category: BinCategory,
    pub label_en: &'static str,
    pub label_ur: &'static str,
    pub items_en: &'static [&'static str],
    /// Bin colour, used for the result card border and the guide swatch
    pub accent: [u8; 3],
    pub background: [u8; 3],
    pub text: [u8; 3],
}

pub static BIN_GUIDE: [BinInfo; 4] = [
    BinInfo {
        category: BinCategory::Green,
        label_en: "Recycle",
        label_ur: "ری سائیکل",
        items_en: &["Clean plastic bottles", "Metal cans", "Clean cardboard"],
        accent: [34, 197, 94],
        background: [240, 253, 244],
        text: [22, 101, 52],
    },
    BinInfo {
        category: BinCategory::Yellow,
        label_en: "Compost",
        label_ur: "کھاد",
        items_en: &["Food waste", "Organic waste", "Dirty pizza boxes"],
        accent: [250, 204, 21],
        background: [254, 252, 232],
        text: [133, 77, 14],
    },
    BinInfo {
        category: BinCategory::Red,
        label_en: "Hazard",
        label_ur: "خطرناک",
        items_en: &["Batteries", "Electronics", "Chemicals", "Medical"],
        accent: [239, 68, 68],
        background: [254, 242, 242],
        text: [153, 27, 27],
    },
    BinInfo {
        category: BinCategory::Grey,
        label_en: "Trash",
        label_ur: "کچرا",
        items_en: &["Wrappers", "Soft plastic", "Unrecognizable items"],
        accent: [107, 114, 128],
        background: [249, 250, 251],
        text: [31, 41, 55],
    },
];

pub fn bin_info(category: BinCategory) -> &'static BinInfo {
    match category {
        BinCategory::Green => &BIN_GUIDE[0],
        BinCategory::Yellow => &BIN_GUIDE[1],
        BinCategory::Red => &BIN_GUIDE[2],
        BinCategory::Grey => &BIN_GUIDE[3],
    }
}

/// Plain-text rendering of the guide for the terminal.
pub fn render_guide() -> String {
    let mut out = String::from("Bin guide\n=========\n");
    for info in BIN_GUIDE.iter() {
        out.push_str(&format!(
            "\n[{}] {} / {}\n  {}\n",
            info.category,
            info.label_en,
            info.label_ur,
            info.items_en.join(", ")
        ));
    }
    out
}
