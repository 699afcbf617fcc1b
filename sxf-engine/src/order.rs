use crate::errors::SxfError;
use crate::scene::{SubfigureDef, SubfigureId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// 从每个部分图出发做深度优先遍历，路径上再次遇到祖先即为循环配置。
pub fn check_cycles(defs: &[SubfigureDef]) -> Result<(), SxfError> {
    let mut marks = vec![Mark::Unvisited; defs.len()];
    for start in 0..defs.len() {
        visit(defs, start, &mut marks)?;
    }
    Ok(())
}

fn visit(defs: &[SubfigureDef], index: usize, marks: &mut [Mark]) -> Result<(), SxfError> {
    match marks[index] {
        Mark::Done => Ok(()),
        Mark::OnPath => Err(SxfError::PlacementCycle {
            name: defs[index].name().to_string(),
        }),
        Mark::Unvisited => {
            marks[index] = Mark::OnPath;
            for child in defs[index].places() {
                visit(defs, child.index(), marks)?;
            }
            marks[index] = Mark::Done;
            Ok(())
        }
    }
}

/// 计算输出顺序：被配置的部分图先于配置它的部分图。
///
/// 每轮取出依赖已全部接受的定义，同一轮内按登记顺序排列。
pub fn dependency_order(defs: &[SubfigureDef]) -> Result<Vec<SubfigureId>, SxfError> {
    let mut accepted = vec![false; defs.len()];
    let mut order = Vec::with_capacity(defs.len());
    while order.len() < defs.len() {
        let ready: Vec<usize> = (0..defs.len())
            .filter(|&index| {
                !accepted[index]
                    && defs[index]
                        .places()
                        .iter()
                        .all(|child| accepted[child.index()])
            })
            .collect();
        if ready.is_empty() {
            // 只有存在循环时才会走到这里
            let stuck = accepted.iter().position(|done| !done).unwrap_or_default();
            return Err(SxfError::PlacementCycle {
                name: defs[stuck].name().to_string(),
            });
        }
        for index in ready {
            accepted[index] = true;
            order.push(SubfigureId(index));
        }
    }
    Ok(order)
}
