//! Skills and crafting recipes

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub static SKILLS: &[SkillDefinition] = &[
    SkillDefinition {
        key: "mining",
        name: "Mining",
        description: "Ability to extract ore from rocks.",
    },
    SkillDefinition {
        key: "herbalism",
        name: "Herbalism",
        description: "Ability to gather herbs.",
    },
    SkillDefinition {
        key: "stealth",
        name: "Stealth",
        description: "Avoid detection by enemies.",
    },
    SkillDefinition {
        key: "smithing",
        name: "Smithing",
        description: "Craft weapons and armor.",
    },
];

/// Skill XP for one successful gather.
pub const GATHER_SKILL_XP: u32 = 10;
/// Skill XP for one successful craft, per required skill.
pub const CRAFT_SKILL_XP: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    pub key: &'static str,
    pub name: &'static str,
    /// Item template keys and quantities consumed.
    pub ingredients: &'static [(&'static str, u32)],
    pub result: &'static str,
    /// Minimum skill levels.
    pub skill_requirements: &'static [(&'static str, u32)],
}

pub static RECIPES: &[Recipe] = &[
    Recipe {
        key: "health_potion",
        name: "Health Potion",
        ingredients: &[("mystic_herb", 2)],
        result: "healing_potion",
        skill_requirements: &[("herbalism", 1)],
    },
    Recipe {
        key: "iron_ingot",
        name: "Iron Ingot",
        ingredients: &[("iron_ore", 2)],
        result: "iron_ingot",
        skill_requirements: &[("smithing", 1)],
    },
    Recipe {
        key: "iron_sword",
        name: "Iron Sword",
        ingredients: &[("iron_ingot", 3)],
        result: "iron_sword",
        skill_requirements: &[("smithing", 2)],
    },
];

pub fn recipe(key: &str) -> Option<&'static Recipe> {
    RECIPES.iter().find(|r| r.key == key)
}

pub fn skill_name(key: &str) -> &str {
    SKILLS
        .iter()
        .find(|s| s.key == key)
        .map(|s| s.name)
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::items::item_template;

    #[test]
    fn recipes_reference_known_items_and_skills() {
        for r in RECIPES {
            assert!(item_template(r.result).is_some(), "{}", r.result);
            for (ingredient, _) in r.ingredients {
                assert!(item_template(ingredient).is_some(), "{}", ingredient);
            }
            for (skill, _) in r.skill_requirements {
                assert!(SKILLS.iter().any(|s| s.key == *skill), "{}", skill);
            }
        }
    }

    #[test]
    fn skill_names() {
        assert_eq!(skill_name("smithing"), "Smithing");
        assert_eq!(skill_name("juggling"), "juggling");
    }
}
