//! Formal given name / nickname equivalences
//!
//! A fixed table keyed by formal name, with a lazily derived reverse
//! index so lookups work in either direction ("Robert" -> "Bob" and
//! "Bob" -> "Robert"). Variants of the same formal name are not linked
//! to each other ("Bob" and "Bobby" both map to "Robert" but are not
//! nickname-linked themselves).

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Formal given names with their common informal variants, all
/// lowercase. Kept alphabetical by formal name.
const NICKNAMES: &[(&str, &[&str])] = &[
    ("albert", &["al", "bert"]),
    ("alexander", &["alex", "sandy", "xander"]),
    ("andrew", &["andy", "drew"]),
    ("anthony", &["tony"]),
    ("barbara", &["barb", "babs"]),
    ("benjamin", &["ben", "benny"]),
    ("catherine", &["cathy", "cat", "kate", "katie"]),
    ("charles", &["charlie", "chuck"]),
    ("christopher", &["chris", "topher"]),
    ("daniel", &["dan", "danny"]),
    ("david", &["dave", "davey"]),
    ("deborah", &["deb", "debbie"]),
    ("donald", &["don", "donny"]),
    ("dorothy", &["dot", "dottie"]),
    ("edward", &["ed", "eddie", "ted", "ned"]),
    ("elizabeth", &["liz", "beth", "betsy", "eliza", "libby"]),
    ("frederick", &["fred", "freddy"]),
    ("gerald", &["gerry", "jerry"]),
    ("gregory", &["greg"]),
    ("henry", &["hank", "harry"]),
    ("jacqueline", &["jackie"]),
    ("james", &["jim", "jimmy", "jamie"]),
    ("jeffrey", &["jeff"]),
    ("jennifer", &["jen", "jenny"]),
    ("jonathan", &["jon", "jonny"]),
    ("joseph", &["joe", "joey"]),
    ("joshua", &["josh"]),
    ("katherine", &["kathy", "kat", "kate", "katie", "kit"]),
    ("kenneth", &["ken", "kenny"]),
    ("kimberly", &["kim"]),
    ("lawrence", &["larry"]),
    ("leonard", &["leo", "lenny"]),
    ("margaret", &["maggie", "meg", "peggy", "marge"]),
    ("matthew", &["matt"]),
    ("michael", &["mike", "mikey"]),
    ("nicholas", &["nick", "nicky"]),
    ("pamela", &["pam"]),
    ("patricia", &["pat", "patty", "trish"]),
    ("patrick", &["pat", "paddy"]),
    ("peter", &["pete"]),
    ("raymond", &["ray"]),
    ("rebecca", &["becky"]),
    ("richard", &["rich", "rick", "ricky", "dick"]),
    ("robert", &["rob", "bob", "bobby", "robbie"]),
    ("ronald", &["ron", "ronnie"]),
    ("samuel", &["sam", "sammy"]),
    ("stephen", &["steve", "stevie"]),
    ("steven", &["steve", "stevie"]),
    ("susan", &["sue", "susie", "suzy"]),
    ("theodore", &["ted", "teddy", "theo"]),
    ("thomas", &["tom", "tommy"]),
    ("timothy", &["tim", "timmy"]),
    ("victoria", &["vicky", "tori"]),
    ("virginia", &["ginny"]),
    ("william", &["will", "bill", "billy", "liam"]),
];

/// formal name -> its variants
static VARIANTS_OF: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| NICKNAMES.iter().map(|(formal, variants)| (*formal, *variants)).collect());

/// variant -> every formal name that lists it ("pat" maps to both
/// "patricia" and "patrick")
static FORMALS_OF: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut reverse: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    for (formal, variants) in NICKNAMES {
        for variant in *variants {
            reverse.entry(variant).or_default().push(formal);
        }
    }
    reverse
});

/// Whether two given-name tokens refer to the same person
///
/// True when the tokens are equal ignoring case, or either one is a
/// listed variant of the other.
pub fn nickname_linked(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(b) {
        return true;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if let Some(variants) = VARIANTS_OF.get(a.as_str()) {
        if variants.contains(&b.as_str()) {
            return true;
        }
    }
    if let Some(formals) = FORMALS_OF.get(a.as_str()) {
        if formals.contains(&b.as_str()) {
            return true;
        }
    }

    false
}
