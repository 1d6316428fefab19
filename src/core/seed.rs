use rand::Rng;
use tracing::info;

use super::error::Result;
use super::post::{NewPost, Role};
use super::store::PostStore;

const MAX_SEED_LIKES: u32 = 50;

struct SeedPost {
    role: Role,
    nickname: &'static str,
    title: &'static str,
    content: &'static str,
}

const SEED_POSTS: &[SeedPost] = &[
    // negative
    SeedPost {
        role: Role::Child,
        nickname: "绝望的深渊",
        title: "我真的坚持不下去了",
        content: "每天只有做不完的作业和考不完的试。父母只会责骂我，从来不关心我累不累。我感觉窒息，活着没有任何意义，我想结束这一切。太痛苦了，真的太痛苦了。",
    },
    SeedPost {
        role: Role::Child,
        nickname: "哭泣的角落",
        title: "为什么总是比较",
        content: "我讨厌被拿来和别人家的孩子比。无论我多努力，在他们眼里永远是不够好的。这种压力让我整夜失眠，头发大把大把地掉，我快崩溃了。",
    },
    SeedPost {
        role: Role::Parent,
        nickname: "甚至想哭的父亲",
        title: "对不起孩子",
        content: "最近失业了，家里经济压力很大，脾气没控制住吼了孩子。看着他恐惧的眼神，我真的好恨自己无能。生活为什么这么难？我该怎么办？",
    },
    // positive
    SeedPost {
        role: Role::Child,
        nickname: "追光的少年",
        title: "今天妈妈拥抱了我",
        content: "今天鼓起勇气和妈妈聊了心里话，没想到她没有骂我，而是紧紧抱住了我。那一刻我感觉所有的委屈都化解了。谢谢你妈妈，我爱你，我们一起加油！",
    },
    SeedPost {
        role: Role::Parent,
        nickname: "幸福的园丁",
        title: "孩子长大了",
        content: "看到孩子主动帮我洗碗，那一刻真的好感动。其实成绩不是最重要的，只要他健康快乐，我就心满意足了。生活充满了希望和阳光，感恩拥有这一切。",
    },
    SeedPost {
        role: Role::Child,
        nickname: "快乐小狗",
        title: "超级开心的一天",
        content: "被老师表扬了！而且周末爸爸答应带我去游乐园！太棒了太棒了！我觉得世界超级美好，充满力量！冲鸭！",
    },
    // neutral
    SeedPost {
        role: Role::Child,
        nickname: "观察者",
        title: "关于校服的建议",
        content: "我们学校的校服面料需要改进一下，夏天有点不透气。希望学校能采纳这个建议。",
    },
    SeedPost {
        role: Role::Parent,
        nickname: "路人",
        title: "今天的天气",
        content: "今天下雨了，出门记得带伞。路况稍微有点堵，大家注意安全。",
    },
];

/// The demo posts, not yet stored
pub fn seed_posts() -> Vec<NewPost> {
    SEED_POSTS
        .iter()
        .map(|p| NewPost::new(p.role, p.nickname, p.title, p.content))
        .collect()
}

/// Insert the demo posts with random like counts; returns how many were added
pub fn seed<R: Rng + ?Sized>(store: &PostStore, rng: &mut R) -> Result<usize> {
    let posts = seed_posts();
    for post in &posts {
        store.create_with_likes(post, rng.gen_range(0..=MAX_SEED_LIKES))?;
    }
    info!(count = posts.len(), "seeded demo posts");
    Ok(posts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lexicon::{Lexicon, ValenceTier};
    use crate::core::scorer::AffectScorer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seed_inserts_all() {
        let store = PostStore::in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let added = seed(&store, &mut rng).unwrap();
        assert_eq!(added, SEED_POSTS.len());
        assert_eq!(store.count().unwrap(), SEED_POSTS.len());
        assert!(store.list().unwrap().iter().all(|p| p.likes <= MAX_SEED_LIKES));
        assert_eq!(store.list_by_role(Role::Parent).unwrap().len(), 3);
    }

    #[test]
    fn test_seed_tones_hit_expected_tiers() {
        let scorer = AffectScorer::with_baseline(Lexicon::builtin().unwrap());
        let tiers: Vec<ValenceTier> = seed_posts()
            .iter()
            .map(|p| scorer.classify_valence(&p.content).tier)
            .collect();

        assert!(tiers[..2].iter().all(|t| *t == ValenceTier::ExtremeNegative));
        assert_eq!(tiers[2], ValenceTier::MildNegative);
        assert!(tiers[3..6].iter().all(|t| *t == ValenceTier::ExtremePositive));
    }
}
