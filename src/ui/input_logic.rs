//! Menu cursor movement and scrolling. The cursor wraps around at both ends.

/// Move selection cursor one item up, wrapping to the last item.
pub fn select_prev(selected: usize, item_count: usize) -> usize {
    match item_count {
        0 => 0,
        _ if selected == 0 || selected >= item_count => item_count - 1,
        _ => selected - 1,
    }
}

/// Move selection cursor one item down, wrapping to the first item.
pub fn select_next(selected: usize, item_count: usize) -> usize {
    if selected + 1 < item_count {
        selected + 1
    } else {
        0
    }
}

/// First visible row of a list showing `rows` items with `selected` in view.
pub fn scroll_offset(selected: usize, item_count: usize, rows: usize) -> usize {
    if rows == 0 || item_count <= rows {
        return 0;
    }
    let selected = selected.min(item_count - 1);
    if selected < rows {
        0
    } else {
        (selected + 1 - rows).min(item_count - rows)
    }
}
