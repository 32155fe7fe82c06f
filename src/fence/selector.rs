use super::Block;

/// Choose the block a cursor refers to.
///
/// The first block whose range contains the cursor wins. Otherwise the block whose opening
/// fence is nearest to the cursor is returned; on equal distance the earlier block is kept.
/// Returns `None` only when `blocks` is empty.
pub fn pick_block(blocks: &[Block], cursor: usize) -> Option<&Block> {
    if let Some(block) = blocks.iter().find(|b| b.contains(cursor)) {
        log::debug!("Cursor {cursor} is inside block at {}..{}", block.start, block.end);
        return Some(block);
    }

    let mut nearest: Option<&Block> = None;
    for block in blocks {
        match nearest {
            // Only a strictly closer block replaces the current pick.
            Some(best) if block.distance_from(cursor) >= best.distance_from(cursor) => {}
            _ => nearest = Some(block),
        }
    }

    if let Some(block) = nearest {
        log::debug!(
            "Cursor {cursor} is outside all blocks; nearest starts at {} (distance {})",
            block.start,
            block.distance_from(cursor)
        );
    }
    nearest
}
