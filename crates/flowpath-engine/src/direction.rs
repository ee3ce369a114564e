use flowpath_model::{DirectionVerdict, ResolvedHop};

/// Compare a resolved path's endpoints against the flow's declared source
/// and destination. The verdict is advisory: reversed and inconsistent
/// paths still get link assignment.
pub fn classify_direction(
    src_ip: &str,
    dst_ip: &str,
    hops: &[&ResolvedHop],
) -> DirectionVerdict {
    let (first, last) = match (hops.first(), hops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return DirectionVerdict::Empty,
    };

    if first.ip == src_ip && last.ip == dst_ip {
        DirectionVerdict::Matched
    } else if first.ip == dst_ip && last.ip == src_ip {
        DirectionVerdict::Reversed
    } else {
        DirectionVerdict::Inconsistent
    }
}
