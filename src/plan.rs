use chrono::{Datelike, Weekday};
use rand::prelude::*;

/// 上半身の種目
pub const UPPER_BODY: &[&str] = &["Push-ups", "V pushups", "Inverted Rows", "Pull-ups"];
/// 下半身の種目
pub const LOWER_BODY: &[&str] = &["Squats", "Lunges", "Glute Bridges", "Calf Raises"];
/// 体幹の種目
pub const CORE: &[&str] = &["Sit-ups", "Plank", "Supermans"];
/// 有酸素の種目
pub const CARDIO: &[&str] = &[
    "Jumping Jacks",
    "Jogging in Place",
    "Running",
    "Jump Rope",
    "Burpees",
];
/// プッシュ日の種目
pub const PUSH_DAY: &[&str] = &["Push-ups", "Shoulder Press"];
/// 脚の日の種目
pub const LEG_DAY: &[&str] = &["Squats", "Lunges", "Calf Raises"];
/// 初心者向けの種目（すべてカウンタ対応）
pub const BEGINNER_FRIENDLY: &[&str] = &[
    "Glute Bridges",
    "Jogging in Place",
    "Jumping Jacks",
    "Lunges",
    "Push-ups",
    "Sit-ups",
    "Squats",
    "Supermans",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Strength,
    Core,
    Cardio,
}

/// 種目のカテゴリ。どのリストにも無い種目は筋力扱い
pub fn category_of(name: &str) -> Category {
    if CARDIO.contains(&name) {
        Category::Cardio
    } else if CORE.contains(&name) {
        Category::Core
    } else {
        Category::Strength
    }
}

/// カテゴリごとの既定レップ目安
pub fn rep_guideline(category: Category) -> &'static str {
    match category {
        Category::Strength => "2 to 3 sets of 8 to 12 reps",
        Category::Core => "2 to 3 sets of 10 to 15 reps",
        Category::Cardio => "30 to 60 seconds",
    }
}

/// 週間プランの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanProfile {
    Beginner,
    Strength,
    Split,
}

impl PlanProfile {
    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "beginner" => Some(Self::Beginner),
            "strength" => Some(Self::Strength),
            "split" | "weeklysplit" => Some(Self::Split),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner Workout Plan",
            Self::Strength => "Strength + Athleticism Plan",
            Self::Split => "Weekly Split Workout Plan",
        }
    }
}

/// 1日分の予定。休息日はexercisesが空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan {
    pub weekday: Weekday,
    pub title: String,
    pub exercises: Vec<String>,
}

impl DayPlan {
    fn rest(weekday: Weekday) -> Self {
        Self {
            weekday,
            title: "Rest".to_string(),
            exercises: Vec::new(),
        }
    }

    fn workout(weekday: Weekday, title: &str, exercises: Vec<String>) -> Self {
        Self {
            weekday,
            title: title.to_string(),
            exercises,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// プールから重複なしでcount個選ぶ。プールが小さければ全部
fn pick<R: Rng>(rng: &mut R, pool: &[&str], count: usize) -> Vec<String> {
    pool.choose_multiple(rng, count.min(pool.len()))
        .map(|s| s.to_string())
        .collect()
}

fn pick_one<R: Rng>(rng: &mut R, pool: &[&str]) -> Option<String> {
    pool.choose(rng).map(|s| s.to_string())
}

/// 月曜から日曜までの7日分のプランを生成する
pub fn weekly_plan<R: Rng>(profile: PlanProfile, rng: &mut R) -> Vec<DayPlan> {
    use Weekday::*;
    match profile {
        PlanProfile::Beginner => [Mon, Tue, Wed, Thu, Fri, Sat, Sun]
            .into_iter()
            .map(|weekday| match weekday {
                Mon | Wed | Fri | Sun => {
                    DayPlan::workout(weekday, "Full Body", pick(rng, BEGINNER_FRIENDLY, 5))
                }
                _ => DayPlan::rest(weekday),
            })
            .collect(),
        PlanProfile::Strength => {
            let mut monday = pick(rng, UPPER_BODY, 3);
            monday.extend(pick_one(rng, CARDIO));
            monday.extend(pick_one(rng, CORE));
            let mut tuesday = pick(rng, LOWER_BODY, 3);
            tuesday.extend(pick_one(rng, CARDIO));
            tuesday.extend(pick_one(rng, CORE));
            vec![
                DayPlan::workout(Mon, "Upper Body + Cardio + Core", monday),
                DayPlan::workout(Tue, "Lower Body + Cardio + Core", tuesday),
                DayPlan::rest(Wed),
                DayPlan::workout(Thu, "Upper Body", pick(rng, UPPER_BODY, 4)),
                DayPlan::workout(Fri, "Lower Body", pick(rng, LOWER_BODY, 4)),
                DayPlan::rest(Sat),
                DayPlan::workout(Sun, "High Cardio", pick(rng, CARDIO, 3)),
            ]
        }
        PlanProfile::Split => {
            let mut monday = pick(rng, UPPER_BODY, 3);
            monday.extend(pick_one(rng, CARDIO));
            let mut tuesday = pick(rng, LOWER_BODY, 3);
            tuesday.extend(pick_one(rng, CARDIO));
            vec![
                DayPlan::workout(Mon, "Upper Body + Cardio", monday),
                DayPlan::workout(Tue, "Lower Body + Cardio", tuesday),
                DayPlan::rest(Wed),
                DayPlan::workout(Thu, "Push Day", pick(rng, PUSH_DAY, 3)),
                DayPlan::workout(Fri, "Leg Day", pick(rng, LEG_DAY, 3)),
                DayPlan::workout(Sat, "Upper Body", pick(rng, UPPER_BODY, 4)),
                DayPlan::rest(Sun),
            ]
        }
    }
}

/// 今日の曜日に対応する1日分を返す
pub fn today_plan<R: Rng>(profile: PlanProfile, rng: &mut R) -> DayPlan {
    let weekday = chrono::Local::now().weekday();
    weekly_plan(profile, rng)
        .into_iter()
        .find(|day| day.weekday == weekday)
        .unwrap_or_else(|| DayPlan::rest(weekday))
}
