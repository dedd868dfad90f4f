use crate::tree::geometry::Bounds;

/// Largest coordinate magnitude accepted from a dump. Anything beyond is
/// treated as malformed.
pub const MAX_COORDINATE: i32 = 1 << 16;

/// Parse the dump's `"[x1,y1][x2,y2]"` bounds attribute.
pub fn parse_bounds(raw: &str) -> Option<Bounds> {
    let inner = raw.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (top_left, bottom_right) = inner.split_once("][")?;
    let (x1, y1) = parse_pair(top_left)?;
    let (x2, y2) = parse_pair(bottom_right)?;
    Some(Bounds::new(x1, y1, x2, y2))
}

/// Malformed bounds collapse to `(0,0)-(0,0)`.
pub fn parse_bounds_or_default(raw: &str) -> Bounds {
    parse_bounds(raw).unwrap_or_default()
}

fn parse_pair(raw: &str) -> Option<(i32, i32)> {
    let (x, y) = raw.split_once(',')?;
    Some((coordinate(x)?, coordinate(y)?))
}

fn coordinate(raw: &str) -> Option<i32> {
    let v: i32 = raw.trim().parse().ok()?;
    (-MAX_COORDINATE..=MAX_COORDINATE).contains(&v).then_some(v)
}
