use fnv::FnvHashMap;

use crate::types::RatingRecord;

/// Maps raw user and movie ids to consecutive keys. Ids are categories, users 1 and 2 are no
/// more alike than users 1 and 1000.
#[derive(Debug, Clone)]
pub struct DataDictionary {
    user_dict: FnvHashMap<i32,u32>,
    movie_dict: FnvHashMap<i32,u32>,
    num_ratings: u64,
}

impl DataDictionary {

    pub fn num_users(&self) -> usize {
        self.user_dict.len()
    }

    pub fn num_movies(&self) -> usize {
        self.movie_dict.len()
    }

    pub fn num_ratings(&self) -> u64 {
        self.num_ratings
    }

    pub fn user_key(&self, user_id: i32) -> Option<u32> {
        self.user_dict.get(&user_id).cloned()
    }

    pub fn movie_key(&self, movie_id: i32) -> Option<u32> {
        self.movie_dict.get(&movie_id).cloned()
    }
 }

impl DataDictionary {

    pub fn from_ratings<'a, T>(ratings: T) -> Self where T: Iterator<Item=&'a RatingRecord> {

        let mut user_index: u32 = 0;
        let mut user_dict: FnvHashMap<i32,u32> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut movie_index: u32 = 0;
        let mut movie_dict: FnvHashMap<i32,u32> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut num_ratings: u64 = 0;

        for rating in ratings {

            if !user_dict.contains_key(&rating.user_id) {
                user_dict.insert(rating.user_id, user_index);
                user_index += 1;
            }

            if !movie_dict.contains_key(&rating.movie_id) {
                movie_dict.insert(rating.movie_id, movie_index);
                movie_index += 1;
            }

            num_ratings += 1;
        }

        DataDictionary { user_dict, movie_dict, num_ratings }
    }
}
