use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// 診断の4軸
///
/// 並び順はタイプコードの文字順 (テンション, ポジション, 距離感, ワークスタイル)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Tension,
    Position,
    Distance,
    Work,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::Tension, Axis::Position, Axis::Distance, Axis::Work];

    /// 軸に属する2つのタイプ文字 (A側, B側)
    pub fn poles(self) -> (Pole, Pole) {
        match self {
            Axis::Tension => (Pole::S, Pole::M),
            Axis::Position => (Pole::F, Pole::B),
            Axis::Distance => (Pole::C, Pole::G),
            Axis::Work => (Pole::P, Pole::Q),
        }
    }

    pub fn pole(self, side: Side) -> Pole {
        let (a, b) = self.poles();
        match side {
            Side::A => a,
            Side::B => b,
        }
    }

    /// この軸に属さない文字なら `None`
    pub fn side_of(self, pole: Pole) -> Option<Side> {
        match self.poles() {
            (a, _) if a == pole => Some(Side::A),
            (_, b) if b == pole => Some(Side::B),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Tension => "tension",
            Axis::Position => "position",
            Axis::Distance => "distance",
            Axis::Work => "work",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 軸の左右。A側が同点時に優先される側
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

/// タイプコードを構成する1文字
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pole {
    /// Sunny (明るい)
    S,
    /// Moon (落ち着いた)
    M,
    /// Front (前に立つ)
    F,
    /// Back (後ろで支える)
    B,
    /// Close (親しみやすい)
    C,
    /// Guard (距離を保つ)
    G,
    /// Persistent (粘り強い)
    P,
    /// Quick (効率的)
    Q,
}

impl Pole {
    pub fn axis(self) -> Axis {
        match self {
            Pole::S | Pole::M => Axis::Tension,
            Pole::F | Pole::B => Axis::Position,
            Pole::C | Pole::G => Axis::Distance,
            Pole::P | Pole::Q => Axis::Work,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Pole::S => 'S',
            Pole::M => 'M',
            Pole::F => 'F',
            Pole::B => 'B',
            Pole::C => 'C',
            Pole::G => 'G',
            Pole::P => 'P',
            Pole::Q => 'Q',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pole::S => "Sunny",
            Pole::M => "Moon",
            Pole::F => "Front",
            Pole::B => "Back",
            Pole::C => "Close",
            Pole::G => "Guard",
            Pole::P => "Persistent",
            Pole::Q => "Quick",
        }
    }
}

/// 6段階の回答 (1 = Aに強く当てはまる, 6 = Bに強く当てはまる)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AnswerLevel(u8);

impl AnswerLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(level: u8) -> Result<Self, Error> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(Error::IllegalAnswer)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for AnswerLevel {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<AnswerLevel> for u8 {
    fn from(level: AnswerLevel) -> Self {
        level.0
    }
}

/// 設問番号から回答への対応。含まれない設問は未回答
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<u32, AnswerLevel>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 回答を格納する。既存の回答は上書き
    pub fn insert(&mut self, question_id: u32, level: AnswerLevel) -> Option<AnswerLevel> {
        self.0.insert(question_id, level)
    }

    pub fn get(&self, question_id: u32) -> Option<AnswerLevel> {
        self.0.get(&question_id).copied()
    }

    pub fn contains(&self, question_id: u32) -> bool {
        self.0.contains_key(&question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, AnswerLevel)> + '_ {
        self.0.iter().map(|(&id, &level)| (id, level))
    }
}

impl FromIterator<(u32, AnswerLevel)> for Answers {
    fn from_iter<I: IntoIterator<Item = (u32, AnswerLevel)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 1軸ぶんの得点 (A側の文字, B側の文字)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AxisScorePair {
    pub a: u32,
    pub b: u32,
}

impl AxisScorePair {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    pub fn add(&mut self, side: Side, points: u32) {
        match side {
            Side::A => self.a += points,
            Side::B => self.b += points,
        }
    }

    /// 得点の高い側。同点はA側
    pub fn leading_side(&self) -> Side {
        if self.a >= self.b {
            Side::A
        } else {
            Side::B
        }
    }

    pub fn total(&self) -> u32 {
        self.a.saturating_add(self.b)
    }
}

/// 4軸の得点
///
/// 保存形式は `{"tension":{"S":5,"M":0},"position":{"F":0,"B":0},...}`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "RawScores", try_from = "RawScores")]
pub struct Scores {
    pub tension: AxisScorePair,
    pub position: AxisScorePair,
    pub distance: AxisScorePair,
    pub work: AxisScorePair,
}

impl Scores {
    pub fn pair(&self, axis: Axis) -> &AxisScorePair {
        match axis {
            Axis::Tension => &self.tension,
            Axis::Position => &self.position,
            Axis::Distance => &self.distance,
            Axis::Work => &self.work,
        }
    }

    pub fn pair_mut(&mut self, axis: Axis) -> &mut AxisScorePair {
        match axis {
            Axis::Tension => &mut self.tension,
            Axis::Position => &mut self.position,
            Axis::Distance => &mut self.distance,
            Axis::Work => &mut self.work,
        }
    }

    /// 文字ごとの得点
    pub fn points(&self, pole: Pole) -> u32 {
        let axis = pole.axis();
        match axis.side_of(pole) {
            Some(side) => self.pair(axis).get(side),
            None => 0,
        }
    }
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            let (a, b) = axis.poles();
            let pair = self.pair(axis);
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={} {}={}", a.as_char(), pair.a, b.as_char(), pair.b)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct RawScores(BTreeMap<Axis, BTreeMap<Pole, u32>>);

impl From<Scores> for RawScores {
    fn from(scores: Scores) -> Self {
        RawScores(
            Axis::ALL
                .into_iter()
                .map(|axis| {
                    let pair = scores.pair(axis);
                    let (a, b) = axis.poles();
                    (axis, BTreeMap::from([(a, pair.a), (b, pair.b)]))
                })
                .collect(),
        )
    }
}

impl TryFrom<RawScores> for Scores {
    type Error = Error;

    fn try_from(raw: RawScores) -> Result<Self, Self::Error> {
        let mut scores = Scores::default();
        for (axis, points) in raw.0 {
            for (pole, value) in points {
                let side = axis
                    .side_of(pole)
                    .ok_or_else(|| Error::MalformedScores(format!("{pole:?} is not on {axis}")))?;
                scores.pair_mut(axis).add(side, value);
            }
        }
        Ok(scores)
    }
}

/// 16タイプのコード
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaskTypeCode {
    SFCP,
    SFCQ,
    SFGP,
    SFGQ,
    SBCP,
    SBCQ,
    SBGP,
    SBGQ,
    MFCP,
    MFCQ,
    MFGP,
    MFGQ,
    MBCP,
    MBCQ,
    MBGP,
    MBGQ,
}

impl MaskTypeCode {
    /// 各軸でB側なら立つビット (テンションが最上位) の順
    pub const ALL: [MaskTypeCode; 16] = [
        MaskTypeCode::SFCP,
        MaskTypeCode::SFCQ,
        MaskTypeCode::SFGP,
        MaskTypeCode::SFGQ,
        MaskTypeCode::SBCP,
        MaskTypeCode::SBCQ,
        MaskTypeCode::SBGP,
        MaskTypeCode::SBGQ,
        MaskTypeCode::MFCP,
        MaskTypeCode::MFCQ,
        MaskTypeCode::MFGP,
        MaskTypeCode::MFGQ,
        MaskTypeCode::MBCP,
        MaskTypeCode::MBCQ,
        MaskTypeCode::MBGP,
        MaskTypeCode::MBGQ,
    ];

    /// 軸順 (テンション, ポジション, 距離感, ワークスタイル) の左右からコードを組み立てる
    pub fn from_sides(sides: [Side; 4]) -> Self {
        let index = sides.iter().fold(0, |index, side| {
            (index << 1)
                | match side {
                    Side::A => 0,
                    Side::B => 1,
                }
        });
        Self::ALL[index]
    }

    pub fn sides(self) -> [Side; 4] {
        let index = self as usize;
        [3, 2, 1, 0].map(|shift| {
            if (index >> shift) & 1 == 0 {
                Side::A
            } else {
                Side::B
            }
        })
    }

    pub fn poles(self) -> [Pole; 4] {
        let sides = self.sides();
        [0, 1, 2, 3].map(|i| Axis::ALL[i].pole(sides[i]))
    }

    pub fn pole(self, axis: Axis) -> Pole {
        self.poles()[axis as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MaskTypeCode::SFCP => "SFCP",
            MaskTypeCode::SFCQ => "SFCQ",
            MaskTypeCode::SFGP => "SFGP",
            MaskTypeCode::SFGQ => "SFGQ",
            MaskTypeCode::SBCP => "SBCP",
            MaskTypeCode::SBCQ => "SBCQ",
            MaskTypeCode::SBGP => "SBGP",
            MaskTypeCode::SBGQ => "SBGQ",
            MaskTypeCode::MFCP => "MFCP",
            MaskTypeCode::MFCQ => "MFCQ",
            MaskTypeCode::MFGP => "MFGP",
            MaskTypeCode::MFGQ => "MFGQ",
            MaskTypeCode::MBCP => "MBCP",
            MaskTypeCode::MBCQ => "MBCQ",
            MaskTypeCode::MBGP => "MBGP",
            MaskTypeCode::MBGQ => "MBGQ",
        }
    }
}

impl FromStr for MaskTypeCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| Error::UnknownTypeCode(s.to_string()))
    }
}

impl fmt::Display for MaskTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_axis_side_of() {
        assert_eq!(Axis::Tension.side_of(Pole::S), Some(Side::A));
        assert_eq!(Axis::Tension.side_of(Pole::M), Some(Side::B));
        assert_eq!(Axis::Tension.side_of(Pole::F), None);
        assert_eq!(Axis::Work.side_of(Pole::Q), Some(Side::B));
        for axis in Axis::ALL {
            let (a, b) = axis.poles();
            assert_eq!(a.axis(), axis);
            assert_eq!(b.axis(), axis);
        }
    }

    #[test]
    fn test_answer_level() {
        assert!(AnswerLevel::new(0).is_err());
        assert!(AnswerLevel::new(1).is_ok());
        assert!(AnswerLevel::new(6).is_ok());
        assert!(AnswerLevel::new(7).is_err());
        assert!(serde_json::from_str::<AnswerLevel>("9").is_err());
        assert_eq!(serde_json::from_str::<AnswerLevel>("4").unwrap().get(), 4);
    }

    #[test]
    fn test_answers_json() {
        let answers: Answers = serde_json::from_str(r#"{"1":1,"12":6}"#).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get(12).map(AnswerLevel::get), Some(6));
        assert_eq!(answers.get(2), None);
        assert!(serde_json::from_str::<Answers>(r#"{"1":0}"#).is_err());
        let pairs = answers.iter().map(|(id, level)| (id, level.get())).collect::<Vec<_>>();
        assert_eq!(pairs, vec![(1, 1), (12, 6)]);
    }

    #[test]
    fn test_leading_side_ties_to_a() {
        assert_eq!(AxisScorePair { a: 0, b: 0 }.leading_side(), Side::A);
        assert_eq!(AxisScorePair { a: 3, b: 3 }.leading_side(), Side::A);
        assert_eq!(AxisScorePair { a: 2, b: 3 }.leading_side(), Side::B);
    }

    #[test]
    fn test_scores_json_shape() {
        let mut scores = Scores::default();
        scores.tension.a = 5;
        scores.work.b = 3;
        let value = serde_json::to_value(scores).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "tension": {"S": 5, "M": 0},
                "position": {"F": 0, "B": 0},
                "distance": {"C": 0, "G": 0},
                "work": {"P": 0, "Q": 3},
            })
        );
        let back: Scores = serde_json::from_value(value).unwrap();
        assert_eq!(back, scores);
    }

    #[test]
    fn test_scores_display() {
        let mut scores = Scores::default();
        scores.tension.b = 5;
        scores.distance.a = 3;
        assert_eq!(scores.to_string(), "S=0 M=5 F=0 B=0 C=3 G=0 P=0 Q=0");
        assert_eq!(scores.points(Pole::M), 5);
        assert_eq!(scores.points(Pole::C), 3);
        assert_eq!(scores.points(Pole::Q), 0);
    }

    #[test]
    fn test_total_saturates() {
        assert_eq!(AxisScorePair { a: 3, b: 5 }.total(), 8);
        let scores: Scores =
            serde_json::from_str(r#"{"work":{"P":4294967295,"Q":10}}"#).unwrap();
        assert_eq!(scores.work.total(), u32::MAX);
    }

    #[test]
    fn test_scores_json_rejects_foreign_pole() {
        let result = serde_json::from_str::<Scores>(r#"{"tension":{"F":1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_type_code_sides() {
        for code in MaskTypeCode::ALL {
            assert_eq!(MaskTypeCode::from_sides(code.sides()), code);
            let letters = code.poles().map(Pole::as_char).iter().collect::<String>();
            assert_eq!(letters, code.as_str());
        }
        assert_eq!(MaskTypeCode::from_sides([Side::A; 4]), MaskTypeCode::SFCP);
        assert_eq!(MaskTypeCode::from_sides([Side::B; 4]), MaskTypeCode::MBGQ);
        assert_eq!(
            MaskTypeCode::from_sides([Side::B, Side::A, Side::A, Side::B]),
            MaskTypeCode::MFCQ
        );
        assert_eq!(MaskTypeCode::MFCQ.pole(Axis::Work), Pole::Q);
    }

    #[test]
    fn test_type_code_from_str() {
        assert_eq!("SBGP".parse::<MaskTypeCode>().unwrap(), MaskTypeCode::SBGP);
        assert!("sbgp".parse::<MaskTypeCode>().is_err());
        assert!("SBG".parse::<MaskTypeCode>().is_err());
        assert_eq!(
            serde_json::to_string(&MaskTypeCode::MBCQ).unwrap(),
            "\"MBCQ\""
        );
    }
}
