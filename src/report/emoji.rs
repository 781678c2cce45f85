//! Item emoji for chat reports.

/// Keyword groups checked in order; the first group with a keyword contained
/// in the lowercased item name wins.
const ITEM_EMOJI: &[(&[&str], &str)] = &[
    // Materials
    (&["iron", "steel", "metal"], "⚔️"),
    (&["wood", "lumber", "board", "log"], "🪵"),
    (&["stone", "granite", "limestone", "rock"], "🪨"),
    (&["coal", "charcoal"], "⚫"),
    (&["oil", "petroleum"], "🛢️"),
    (&["glass"], "🔮"),
    (&["clay", "pottery"], "🏺"),
    (&["sand"], "⏳"),
    (&["cement", "concrete", "mortar"], "🧱"),
    (&["copper"], "🔶"),
    (&["gold"], "✨"),
    // Food
    (&["meat", "bacon", "sausage"], "🥓"),
    (&["vegetable", "salad", "beet", "corn"], "🥗"),
    (&["fruit", "berry", "apple", "pineapple"], "🍍"),
    (&["bread", "flour", "wheat"], "🍞"),
    (&["soup", "stew"], "🍲"),
    (&["fish", "seafood"], "🐟"),
    (&["milk", "cheese"], "🥛"),
    (&["sugar", "syrup"], "🍯"),
    (&["bean", "seed"], "🌱"),
    (&["mushroom"], "🍄"),
    // Tools
    (&["axe", "hammer", "pickaxe", "shovel", "tool"], "🔨"),
    (&["wheel", "gear", "mechanical"], "⚙️"),
    (&["cart", "wagon"], "🛒"),
    (&["mill"], "🌀"),
    (&["pump"], "🔧"),
    (&["saw", "blade"], "🪚"),
    (&["drill"], "🔩"),
    (&["anchor"], "⚓"),
    // Textiles
    (&["fabric", "cloth", "textile", "yarn"], "🧵"),
    (&["shirt", "clothing"], "👕"),
    (&["pants", "trousers"], "👖"),
    (&["shoes", "boots"], "👢"),
    (&["hat", "cap"], "🎩"),
    (&["backpack", "bag"], "🎒"),
    (&["belt"], "🔗"),
    (&["canvas"], "🎨"),
    // Furniture
    (&["table", "desk", "chair", "bench"], "🪑"),
    (&["bed"], "🛏️"),
    (&["door"], "🚪"),
    (&["rug", "carpet"], "🏠"),
    (&["couch", "sofa"], "🛋️"),
    (&["lamp", "light"], "💡"),
    (&["mirror"], "🪞"),
    (&["fountain"], "⛲"),
    // Chemicals
    (&["powder", "dust"], "💨"),
    (&["acid", "chemical"], "🧪"),
    (&["fertilizer", "compost"], "🌿"),
    (&["ink", "dye"], "🖋️"),
    (&["explosive"], "💥"),
    // Decoration
    (&["art", "paint"], "🎨"),
    (&["tapestry", "decoration"], "🖼️"),
    (&["bunting", "streamer"], "🎊"),
    (&["sign"], "🪧"),
    (&["plaque"], "🏷️"),
    // Misc
    (&["paper", "research"], "📄"),
    (&["nail", "screw"], "📎"),
    (&["rope", "cord"], "🪢"),
    (&["fiber"], "🧶"),
    (&["waste", "dirt", "trash"], "🗑️"),
];

/// Fallback for items matching no keyword.
pub const DEFAULT_EMOJI: &str = "📦";

/// Pick an emoji for an item name.
pub fn item_emoji(item: &str) -> &'static str {
    let lower = item.to_lowercase();
    ITEM_EMOJI
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_EMOJI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_keywords_in_order() {
        assert_eq!(item_emoji("Hewn Log"), "🪵");
        assert_eq!(item_emoji("Iron Bar"), "⚔️");
        // "steel axe" hits the metal group before the tool group
        assert_eq!(item_emoji("Steel Axe"), "⚔️");
        assert_eq!(item_emoji("Stone Axe"), "🪨");
        assert_eq!(item_emoji("Bread"), "🍞");
    }

    #[test]
    fn unknown_items_get_default() {
        assert_eq!(item_emoji("Zzyzx"), DEFAULT_EMOJI);
        assert_eq!(item_emoji(""), DEFAULT_EMOJI);
    }
}
