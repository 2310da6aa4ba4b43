//! Key abbreviation table.
//!
//! Dense documents use short keys (`nm`, `ct`, `em`); the human format shows
//! the full names (`name`, `count`, `email`). The table is a fixed bijection:
//! every abbreviation maps to exactly one full name and back, no entry maps a
//! key to itself, and no string is both an abbreviation and a full name.
//! Keys that are not in the table pass through unchanged in both directions.
//!
//! ```rust
//! use dx_codec::abbrev::{compress_key, expand_key};
//!
//! assert_eq!(expand_key("nm"), "name");
//! assert_eq!(compress_key("name"), "nm");
//! assert_eq!(expand_key("unlisted"), "unlisted");
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

/// `(abbreviation, full name)` pairs.
pub static ABBREVIATIONS: &[(&str, &str)] = &[
    // identity and naming
    ("nm", "name"),
    ("tt", "title"),
    ("ds", "description"),
    ("lb", "label"),
    ("al", "alias"),
    ("uid", "unique_id"),
    ("hdl", "handle"),
    ("disp", "display_name"),
    ("ref", "reference"),
    ("nick", "nickname"),
    ("abbr", "abbreviation"),
    // state
    ("st", "status"),
    ("ac", "active"),
    ("en", "enabled"),
    ("vs", "visible"),
    ("lk", "locked"),
    ("ar", "archived"),
    ("dl", "deleted"),
    ("cp", "completed"),
    ("pn", "pending"),
    ("rdy", "ready"),
    ("pub", "published"),
    ("drft", "draft"),
    ("appr", "approved"),
    ("rej", "rejected"),
    ("susp", "suspended"),
    ("exp", "expired"),
    ("canc", "cancelled"),
    ("proc", "processing"),
    ("fail", "failed"),
    ("succ", "success"),
    // time
    ("cr", "created"),
    ("up", "updated"),
    ("dt", "date"),
    ("tm", "time"),
    ("ts", "timestamp"),
    ("ex", "expires"),
    ("du", "duration"),
    ("yr", "year"),
    ("tz", "timezone"),
    ("mo", "month"),
    ("dy", "day"),
    ("hr", "hour"),
    ("mn", "minute"),
    ("sec", "second"),
    ("ms", "millisecond"),
    ("strt", "start"),
    ("schd", "scheduled"),
    ("dln", "deadline"),
    // metrics
    ("ct", "count"),
    ("tl", "total"),
    ("am", "amount"),
    ("pr", "price"),
    ("qt", "quantity"),
    ("km", "kilometers"),
    ("mi", "miles"),
    ("el", "elevation"),
    ("rt", "rating"),
    ("sc", "score"),
    ("rk", "rank"),
    ("pct", "percent"),
    ("avg", "average"),
    ("idx", "index"),
    ("pos", "position"),
    ("num", "number"),
    ("min", "minimum"),
    ("max", "maximum"),
    ("med", "median"),
    ("std", "standard_deviation"),
    ("var", "variance"),
    ("ord", "order"),
    ("seq", "sequence"),
    // dimensions
    ("wd", "width"),
    ("ht", "height"),
    ("sz", "size"),
    ("len", "length"),
    ("wt", "weight"),
    ("dp", "depth"),
    ("vol", "volume"),
    ("rad", "radius"),
    ("dia", "diameter"),
    ("cap", "capacity"),
    ("res", "resolution"),
    ("asp", "aspect_ratio"),
    ("scl", "scale"),
    // web
    ("ur", "url"),
    ("pt", "path"),
    ("src", "source"),
    ("dst", "destination"),
    ("ep", "endpoint"),
    ("mth", "method"),
    ("req", "request"),
    ("rsp", "response"),
    ("ip", "ip_address"),
    ("lnk", "link"),
    ("dom", "domain"),
    ("hdr", "header"),
    ("bdy", "body"),
    ("qry", "query"),
    ("prm", "param"),
    ("prot", "protocol"),
    ("cert", "certificate"),
    // contact
    ("em", "email"),
    ("ph", "phone"),
    ("ad", "address"),
    ("fn", "first_name"),
    ("lnm", "last_name"),
    ("cmp", "company"),
    ("lang", "language"),
    ("dob", "date_of_birth"),
    ("gen", "gender"),
    ("bio", "biography"),
    ("avt", "avatar"),
    ("prof", "profile"),
    ("pref", "preferences"),
    ("cntry", "country_code"),
    ("mob", "mobile"),
    // location
    ("cy", "city"),
    ("co", "country"),
    ("rg", "region"),
    ("zp", "zipcode"),
    ("la", "latitude"),
    ("lo", "longitude"),
    ("loc", "location"),
    ("addr", "street_address"),
    ("st2", "address_line_2"),
    ("prov", "province"),
    ("dist", "district"),
    ("bldg", "building"),
    ("flr", "floor"),
    // media
    ("cl", "color"),
    ("im", "image"),
    ("fmt", "format"),
    ("bg", "background"),
    ("fg", "foreground"),
    ("ic", "icon"),
    ("th", "thumbnail"),
    ("vid", "video"),
    ("aud", "audio"),
    ("mime", "mime_type"),
    ("ext", "extension"),
    ("fsize", "file_size"),
    ("bps", "bitrate"),
    ("fps", "framerate"),
    // relations
    ("pa", "parent"),
    ("ch", "children"),
    ("us", "user"),
    ("ow", "owner"),
    ("au", "author"),
    ("mb", "member"),
    ("gp", "group"),
    ("org", "organization"),
    ("ed", "editor"),
    ("rv", "reviewer"),
    ("asg", "assignee"),
    ("tea", "team"),
    ("dept", "department"),
    ("mgr", "manager"),
    ("sup", "supervisor"),
    ("sub", "subordinate"),
    ("anc", "ancestor"),
    ("desc", "descendant"),
    ("sib", "sibling"),
    // classification
    ("ca", "category"),
    ("tg", "tags"),
    ("tp", "type"),
    ("vl", "value"),
    ("ky", "key"),
    ("md", "mode"),
    ("lv", "level"),
    ("pri", "priority"),
    ("vr", "version"),
    ("cls", "class"),
    ("grp", "group_type"),
    // project
    ("ws", "workspace"),
    ("repo", "repository"),
    ("proj", "project"),
    ("env", "environment"),
    ("dep", "dependency"),
    ("cont", "container"),
    ("ci", "ci_cd"),
    ("eds", "editors"),
    ("sett", "settings"),
    ("opt", "options"),
    ("feat", "feature"),
    ("mod", "module"),
    ("pkg", "package"),
    ("lib", "library"),
    // commerce
    ("cu", "customer"),
    ("inv", "invoice"),
    ("prd", "product"),
    ("tx", "tax"),
    ("curr", "currency"),
    ("bal", "balance"),
    ("sk", "sku"),
    ("sh", "shipping"),
    ("pd", "paid"),
    ("dsc", "discount"),
    ("cred", "credit"),
    ("deb", "debit"),
    ("grt", "grand_total"),
    ("pay", "payment"),
    ("refnd", "refund"),
    ("chk", "checkout"),
    ("bill", "billing"),
    // text
    ("txt", "text"),
    ("msg", "message"),
    ("cmt", "comment"),
    ("nt", "note"),
    ("cnt", "content"),
    ("ft", "footer"),
    ("para", "paragraph"),
    ("sect", "section"),
    ("chap", "chapter"),
    ("art", "article"),
    ("subj", "subject"),
    // security
    ("pwd", "password"),
    ("tok", "token"),
    ("sess", "session"),
    ("perm", "permission"),
    ("auth", "authorization"),
    ("acl", "access_control"),
    ("enc", "encrypted"),
    ("sig", "signature"),
    ("otp", "one_time_password"),
    // data
    ("tbl", "table"),
    ("col", "column"),
    ("rec", "record"),
    ("fld", "field"),
    // tooling
    ("sev", "severity"),
    ("fix", "fixable"),
    ("recom", "recommended"),
    ("fmtr", "formatter"),
    ("pfx", "prefix"),
    ("docs", "documentation"),
    ("warn", "warning"),
    ("err", "error"),
    ("lint", "linter"),
];

/// Section-dependent readings of single-letter keys, as
/// `(key, section, full name)`. The `default` row applies when no section
/// matches.
pub static CONTEXTUAL: &[(&str, &str, &str)] = &[
    ("s", "hikes", "sunny"),
    ("s", "weather", "sunny"),
    ("s", "orders", "status"),
    ("s", "tasks", "status"),
    ("s", "config", "season"),
    ("s", "default", "status"),
    ("w", "hikes", "with"),
    ("w", "images", "width"),
    ("w", "products", "weight"),
    ("w", "default", "width"),
    ("t", "config", "task"),
    ("t", "products", "type"),
    ("t", "events", "time"),
    ("t", "default", "type"),
    ("l", "geo", "location"),
    ("l", "maps", "location"),
    ("l", "text", "length"),
    ("l", "default", "location"),
    ("n", "users", "name"),
    ("n", "items", "name"),
    ("n", "math", "number"),
    ("n", "default", "name"),
    ("d", "calendar", "date"),
    ("d", "events", "date"),
    ("d", "items", "description"),
    ("d", "default", "date"),
    ("c", "metrics", "count"),
    ("c", "items", "category"),
    ("c", "visual", "color"),
    ("c", "default", "count"),
    ("v", "data", "value"),
    ("v", "software", "version"),
    ("v", "default", "version"),
    ("p", "commerce", "price"),
    ("p", "tasks", "priority"),
    ("p", "files", "path"),
    ("p", "default", "price"),
    ("a", "metrics", "amount"),
    ("a", "users", "author"),
    ("a", "geo", "address"),
    ("a", "default", "amount"),
    ("e", "contact", "email"),
    ("e", "events", "end"),
    ("e", "status", "enabled"),
    ("e", "default", "email"),
    ("u", "web", "url"),
    ("u", "auth", "user"),
    ("u", "time", "updated"),
    ("u", "default", "user"),
];

struct Index {
    expand: HashMap<&'static str, &'static str>,
    compress: HashMap<&'static str, &'static str>,
}

fn index() -> &'static Index {
    static INDEX: OnceLock<Index> = OnceLock::new();
    INDEX.get_or_init(|| Index {
        expand: ABBREVIATIONS.iter().copied().collect(),
        compress: ABBREVIATIONS.iter().map(|&(a, f)| (f, a)).collect(),
    })
}

/// Expands an abbreviated key to its full name, or returns it unchanged.
#[must_use]
pub fn expand_key(key: &str) -> &str {
    index().expand.get(key).copied().unwrap_or(key)
}

/// Reads `key` the way it is meant inside `section`.
///
/// Single-letter keys are ambiguous (`w` is a width in `images` and a weight
/// in `products`) and resolve through [`CONTEXTUAL`], falling back to the
/// key's `default` reading. Longer keys go through [`expand_key`]. This lookup
/// has no inverse, so the text formats never apply it.
///
/// ```rust
/// use dx_codec::abbrev::expand_key_in;
///
/// assert_eq!(expand_key_in("w", "products"), "weight");
/// assert_eq!(expand_key_in("w", "unknown"), "width");
/// assert_eq!(expand_key_in("nm", "products"), "name");
/// ```
#[must_use]
pub fn expand_key_in<'a>(key: &'a str, section: &str) -> &'a str {
    let reading = |context: &str| {
        CONTEXTUAL
            .iter()
            .find(|&&(k, c, _)| k == key && c == context)
            .map(|&(_, _, full)| full)
    };
    reading(section)
        .or_else(|| (key.chars().count() == 1).then(|| reading("default")).flatten())
        .unwrap_or_else(|| expand_key(key))
}

/// Compresses a full key name to its abbreviation, or returns it unchanged.
#[must_use]
pub fn compress_key(key: &str) -> &str {
    index().compress.get(key).copied().unwrap_or(key)
}

/// Returns `true` if `key` is a known abbreviation.
#[must_use]
pub fn is_abbreviation(key: &str) -> bool {
    index().expand.contains_key(key)
}
