use crate::errors::GruError;
use std::fmt;
use std::str::FromStr;

/// 时间轴的遍历方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
    Bidirectional,
}

impl Direction {
    /// 方向数：双向为2，其余为1
    pub const fn num_directions(&self) -> usize {
        match self {
            Self::Bidirectional => 2,
            Self::Forward | Self::Reverse => 1,
        }
    }

    /// 按输出中方向槽位的顺序，列出需要执行的单向遍历（双向时正向占槽位0、反向占槽位1）
    pub const fn passes(&self) -> &'static [Direction] {
        match self {
            Self::Forward => &[Self::Forward],
            Self::Reverse => &[Self::Reverse],
            Self::Bidirectional => &[Self::Forward, Self::Reverse],
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
            Self::Bidirectional => "bidirectional",
        }
    }
}

impl FromStr for Direction {
    type Err = GruError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "reverse" => Ok(Self::Reverse),
            "bidirectional" => Ok(Self::Bidirectional),
            _ => Err(GruError::invalid_attribute(
                "direction",
                format!("`{s}`不是forward、reverse或bidirectional"),
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
