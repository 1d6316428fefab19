use rand::Rng;

use super::post::Role;

const PARENT_ADJECTIVES: &[&str] = &[
    "焦虑的", "守望的", "唠叨的", "辛勤的", "默默的", "严厉的", "操心的", "温暖的", "迷茫的", "坚强的",
];
const PARENT_NOUNS: &[&str] = &[
    "猫头鹰", "长颈鹿", "老黄牛", "大树", "避风港", "园丁", "向日葵", "守护者", "大狮子", "啄木鸟",
];

const CHILD_ADJECTIVES: &[&str] = &[
    "想要自由的", "还没睡醒的", "迷茫的", "愤怒的", "追梦的", "压力山大的", "不想说话的", "敏感的",
    "甚至想哭的", "奥特曼打不过的",
];
const CHILD_NOUNS: &[&str] = &[
    "风", "考拉", "刺猬", "独角兽", "小怪兽", "宇航员", "流浪猫", "仙人掌", "蒲公英", "哈士奇",
];

fn word_lists(role: Role) -> (&'static [&'static str], &'static [&'static str]) {
    match role {
        Role::Parent => (PARENT_ADJECTIVES, PARENT_NOUNS),
        Role::Child => (CHILD_ADJECTIVES, CHILD_NOUNS),
    }
}

/// Random "adjective + noun" alias for an anonymous author
pub fn generate<R: Rng + ?Sized>(role: Role, rng: &mut R) -> String {
    let (adjectives, nouns) = word_lists(role);
    let adj = adjectives[rng.gen_range(0..adjectives.len())];
    let noun = nouns[rng.gen_range(0..nouns.len())];
    format!("{}{}", adj, noun)
}
