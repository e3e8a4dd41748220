use crate::skeleton::Side;

/// 操作入力。キーボードの1行、またはフレーム入力中の `{"control": "l"}` 行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlInput {
    Side(Side),
    Gripper { closed: bool },
    Reset,
    Quit,
}

impl ControlInput {
    /// `l` 左腕 / `r` 右腕 / `c` 閉じる / `o` 開く / `x` リセット / `q` 終了
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "l" => Some(ControlInput::Side(Side::Left)),
            "r" => Some(ControlInput::Side(Side::Right)),
            "c" => Some(ControlInput::Gripper { closed: true }),
            "o" => Some(ControlInput::Gripper { closed: false }),
            "x" => Some(ControlInput::Reset),
            "q" => Some(ControlInput::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(ControlInput::parse("l"), Some(ControlInput::Side(Side::Left)));
        assert_eq!(ControlInput::parse(" r \n"), Some(ControlInput::Side(Side::Right)));
        assert_eq!(ControlInput::parse("c"), Some(ControlInput::Gripper { closed: true }));
        assert_eq!(ControlInput::parse("o"), Some(ControlInput::Gripper { closed: false }));
        assert_eq!(ControlInput::parse("x"), Some(ControlInput::Reset));
        assert_eq!(ControlInput::parse("q"), Some(ControlInput::Quit));
        assert_eq!(ControlInput::parse("jump"), None);
        assert_eq!(ControlInput::parse(""), None);
    }
}
