use crate::question::Question;
use crate::types::{AnswerLevel, Answers, Axis, MaskTypeCode, Scores};

/// 回答レベルを (A側の点数, B側の点数) に換算する
///
/// | 回答 | A | B |
/// |---|---|---|
/// | 1 | 5 | 0 |
/// | 2 | 3 | 0 |
/// | 3 | 1 | 0 |
/// | 4 | 0 | 1 |
/// | 5 | 0 | 3 |
/// | 6 | 0 | 5 |
///
/// 配点は過去の診断結果と一致させるため固定。
pub fn score_weight(level: AnswerLevel) -> (u32, u32) {
    match level.get() {
        1 => (5, 0),
        2 => (3, 0),
        3 => (1, 0),
        4 => (0, 1),
        5 => (0, 3),
        6 => (0, 5),
        // AnswerLevelは1〜6のみ。範囲外は加点なし
        _ => (0, 0),
    }
}

/// 合計点数方式
///
/// 設問ごとに回答を配点表で換算し、設問の軸のうち選択肢Aの文字にAの点数、
/// 選択肢Bの文字にBの点数を加算する。未回答の設問は読み飛ばす。
/// 軸に属さない文字の選択肢は加算しない。
pub fn calculate_scores(questions: &[Question], answers: &Answers) -> Scores {
    let mut scores = Scores::default();
    for question in questions {
        let Some(level) = answers.get(question.id) else {
            continue;
        };
        let (a_score, b_score) = score_weight(level);
        for (option, points) in [(&question.options.a, a_score), (&question.options.b, b_score)] {
            match question.axis.side_of(option.type_code) {
                Some(side) => scores.pair_mut(question.axis).add(side, points),
                None => log::warn!(
                    "question {} offers {:?} on the {} axis, skipped",
                    question.id,
                    option.type_code,
                    question.axis
                ),
            }
        }
    }
    scores
}

/// 各軸で得点の高い側の文字を軸順に並べる。同点はA側 (S, F, C, P)
pub fn determine_type_code(scores: &Scores) -> MaskTypeCode {
    MaskTypeCode::from_sides(Axis::ALL.map(|axis| scores.pair(axis).leading_side()))
}

/// 16タイプのいずれかであるか
pub fn is_valid_type_code(candidate: &str) -> bool {
    candidate.parse::<MaskTypeCode>().is_ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::question::question;
    use crate::types::{AxisScorePair, Pole};
    use crate::QUESTIONS;
    use pretty_assertions::assert_eq;

    fn level(value: u8) -> AnswerLevel {
        AnswerLevel::new(value).unwrap()
    }

    fn answers(pairs: &[(u32, u8)]) -> Answers {
        pairs.iter().map(|&(id, value)| (id, level(value))).collect()
    }

    #[test]
    fn test_score_weight() {
        let table = (1..=6).map(|value| score_weight(level(value))).collect::<Vec<_>>();
        assert_eq!(table, vec![(5, 0), (3, 0), (1, 0), (0, 1), (0, 3), (0, 5)]);
    }

    #[test]
    fn test_strong_a() {
        let bank = [question(1, Axis::Tension, Pole::S, Pole::M)];
        let scores = calculate_scores(&bank, &answers(&[(1, 1)]));
        assert_eq!(scores.tension, AxisScorePair { a: 5, b: 0 });
        assert_eq!(scores.position, AxisScorePair::default());
        assert_eq!(scores.distance, AxisScorePair::default());
        assert_eq!(scores.work, AxisScorePair::default());
        assert_eq!(determine_type_code(&scores), MaskTypeCode::SFCP);
    }

    #[test]
    fn test_strong_b() {
        let bank = [question(1, Axis::Tension, Pole::S, Pole::M)];
        let scores = calculate_scores(&bank, &answers(&[(1, 6)]));
        assert_eq!(scores.tension, AxisScorePair { a: 0, b: 5 });
        assert_eq!(determine_type_code(&scores).pole(Axis::Tension), Pole::M);
        assert_eq!(determine_type_code(&scores), MaskTypeCode::MFCP);
    }

    #[test]
    fn test_unanswered_is_skipped() {
        let bank = [
            question(1, Axis::Tension, Pole::S, Pole::M),
            question(2, Axis::Work, Pole::P, Pole::Q),
        ];
        let with_unanswered = calculate_scores(&bank, &answers(&[(1, 5)]));
        let without_question = calculate_scores(&bank[..1], &answers(&[(1, 5)]));
        assert_eq!(with_unanswered, without_question);
        assert_eq!(with_unanswered.work, AxisScorePair::default());
    }

    #[test]
    fn test_answers_for_unknown_questions_are_ignored() {
        let bank = [question(1, Axis::Tension, Pole::S, Pole::M)];
        let scores = calculate_scores(&bank, &answers(&[(1, 2), (99, 6)]));
        assert_eq!(scores.tension, AxisScorePair { a: 3, b: 0 });
        assert_eq!(scores.work, AxisScorePair::default());
    }

    #[test]
    fn test_reversed_options_follow_type_code() {
        let bank = [question(1, Axis::Position, Pole::B, Pole::F)];
        let scores = calculate_scores(&bank, &answers(&[(1, 1)]));
        assert_eq!(scores.position, AxisScorePair { a: 0, b: 5 });
        assert_eq!(determine_type_code(&scores), MaskTypeCode::SBCP);
    }

    #[test]
    fn test_malformed_question_is_guarded() {
        let bank = [
            question(1, Axis::Distance, Pole::C, Pole::Q),
            question(2, Axis::Tension, Pole::F, Pole::B),
        ];
        let scores = calculate_scores(&bank, &answers(&[(1, 6), (2, 1)]));
        assert_eq!(scores, Scores::default());

        let scores = calculate_scores(&bank, &answers(&[(1, 1)]));
        assert_eq!(scores.distance, AxisScorePair { a: 5, b: 0 });
        assert_eq!(scores.work, AxisScorePair::default());
    }

    #[test]
    fn test_contribution_sum() {
        let bank = QUESTIONS.questions();
        let mut given = Answers::new();
        for (index, question) in bank.iter().enumerate() {
            if index % 7 != 3 {
                given.insert(question.id, level((index % 6) as u8 + 1));
            }
        }
        let scores = calculate_scores(bank, &given);
        for axis in Axis::ALL {
            let expected: u32 = bank
                .iter()
                .filter(|question| question.axis == axis)
                .filter_map(|question| given.get(question.id))
                .map(|level| {
                    let (a, b) = score_weight(level);
                    a + b
                })
                .sum();
            assert_eq!(scores.pair(axis).total(), expected, "{axis}");
        }
    }

    #[test]
    fn test_idempotent() {
        let given = answers(&[(1, 1), (2, 4), (3, 6), (21, 2), (40, 3)]);
        let first = calculate_scores(QUESTIONS.questions(), &given);
        let second = calculate_scores(QUESTIONS.questions(), &given);
        assert_eq!(first, second);
        assert_eq!(determine_type_code(&first), determine_type_code(&second));
    }

    #[test]
    fn test_no_answers() {
        let scores = calculate_scores(QUESTIONS.questions(), &Answers::new());
        assert_eq!(scores, Scores::default());
        assert_eq!(determine_type_code(&scores), MaskTypeCode::SFCP);
    }

    #[test]
    fn test_all_ties() {
        let pair = AxisScorePair { a: 4, b: 4 };
        let scores = Scores {
            tension: pair,
            position: pair,
            distance: pair,
            work: pair,
        };
        assert_eq!(determine_type_code(&scores), MaskTypeCode::SFCP);
    }

    #[test]
    fn test_each_axis() {
        let mut scores = Scores::default();
        scores.position.b = 1;
        assert_eq!(determine_type_code(&scores), MaskTypeCode::SBCP);
        scores.distance.b = 2;
        assert_eq!(determine_type_code(&scores), MaskTypeCode::SBGP);
        scores.work.b = 3;
        assert_eq!(determine_type_code(&scores), MaskTypeCode::SBGQ);
        scores.tension.b = 1;
        assert_eq!(determine_type_code(&scores), MaskTypeCode::MBGQ);
    }

    #[test]
    fn test_monotonic_a_side() {
        let mut scores = Scores::default();
        scores.tension.b = 3;
        scores.position.b = 5;
        scores.work.a = 1;
        let before = determine_type_code(&scores);
        assert_eq!(before, MaskTypeCode::MBCP);

        for bump in 1..=6 {
            let mut raised = scores;
            raised.tension.a += bump;
            let after = determine_type_code(&raised);
            let expected = if bump >= 3 { Pole::S } else { Pole::M };
            assert_eq!(after.pole(Axis::Tension), expected);
            for axis in [Axis::Position, Axis::Distance, Axis::Work] {
                assert_eq!(after.pole(axis), before.pole(axis));
            }
        }
    }

    #[test]
    fn test_resolver_output_is_valid() {
        for tension in 0..3 {
            for position in 0..3 {
                for distance in 0..3 {
                    for work in 0..3 {
                        let scores = Scores {
                            tension: AxisScorePair { a: 1, b: tension },
                            position: AxisScorePair { a: 1, b: position },
                            distance: AxisScorePair { a: 1, b: distance },
                            work: AxisScorePair { a: 1, b: work },
                        };
                        let code = determine_type_code(&scores);
                        assert!(is_valid_type_code(code.as_str()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_is_valid_type_code() {
        for code in MaskTypeCode::ALL {
            assert!(is_valid_type_code(code.as_str()));
        }
        assert!(!is_valid_type_code(""));
        assert!(!is_valid_type_code("SFC"));
        assert!(!is_valid_type_code("SFCPX"));
        assert!(!is_valid_type_code("sfcp"));
        assert!(!is_valid_type_code("SMCP"));
        assert!(!is_valid_type_code("仮面"));
    }

    #[test]
    fn test_bundled_all_strong_a() {
        let bank = QUESTIONS.questions();
        let given = bank.iter().map(|question| (question.id, level(1))).collect();
        let scores = calculate_scores(bank, &given);
        // 各軸8問がA側、2問がB側の文字
        for axis in Axis::ALL {
            assert_eq!(*scores.pair(axis), AxisScorePair { a: 40, b: 10 }, "{axis}");
        }
        assert_eq!(determine_type_code(&scores), MaskTypeCode::SFCP);
    }
}
