use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::types::{Axis, Pole};
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    pub type_code: Pole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions {
    #[serde(rename = "A")]
    pub a: QuestionOption,
    #[serde(rename = "B")]
    pub b: QuestionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub axis: Axis,
    pub text: String,
    pub options: QuestionOptions,
}

impl Question {
    /// A/Bの文字が、設問の軸に属する異なる2文字であること
    pub fn is_well_formed(&self) -> bool {
        match (
            self.axis.side_of(self.options.a.type_code),
            self.axis.side_of(self.options.b.type_code),
        ) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

/// 設問マスタ。設問の並びは出題順
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// 設問番号の重複は読み込み時に拒否する。軸との整合は [`QuestionBank::validate`] で確認する
    pub fn new(questions: Vec<Question>) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        if let Some(question) = questions.iter().find(|question| !seen.insert(question.id)) {
            return Err(Error::DuplicateQuestion(question.id));
        }
        log::debug!("loaded {} questions", questions.len());
        Ok(Self { questions })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let bank: QuestionBank = serde_json::from_reader(reader)?;
        Self::new(bank.questions)
    }

    /// 出題順で取得する
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// 設問番号を指定して設問を取得する
    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// 全設問を出題順で取得する
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self.questions.iter().find(|question| !question.is_well_formed()) {
            Some(question) => Err(Error::MalformedQuestion(question.id)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) fn question(id: u32, axis: Axis, a: Pole, b: Pole) -> Question {
    Question {
        id,
        axis,
        text: format!("question {id}"),
        options: QuestionOptions {
            a: QuestionOption {
                text: "x".to_string(),
                type_code: a,
            },
            b: QuestionOption {
                text: "y".to_string(),
                type_code: b,
            },
        },
    }
}
