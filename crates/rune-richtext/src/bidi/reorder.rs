/// Reorder runs into visual order with UAX-9 rule L2.
///
/// From the highest level down to the lowest odd level, every maximal
/// sequence of runs at that level or higher is reversed. `order` receives
/// logical indices in left-to-right visual order.
pub fn reorder_levels(levels: &[u8], order: &mut Vec<usize>) {
    order.clear();
    order.extend(0..levels.len());

    let Some(&highest) = levels.iter().max() else {
        return;
    };
    let Some(lowest_odd) = levels.iter().map(|&l| l | 1).min() else {
        return;
    };

    let mut level = highest;
    while level >= lowest_odd {
        let mut i = 0;
        while i < levels.len() {
            if levels[order[i]] >= level {
                let start = i;
                while i < levels.len() && levels[order[i]] >= level {
                    i += 1;
                }
                order[start..i].reverse();
            } else {
                i += 1;
            }
        }
        if level == 0 {
            break;
        }
        level -= 1;
    }
}
