//! Built-in word data
//!
//! Two read-only tables live here: the built-in categories that can be
//! selected directly for a round, and the predefined templates a player can
//! copy into their own custom banks. Templates are grouped into themes for
//! browsing; every template not claimed by a fixed theme ends up under
//! "Other".

/// A built-in category, selectable by name
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub name: &'static str,
    pub words: &'static [&'static str],
}

/// A predefined word list that can be saved as a custom bank
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub words: &'static [&'static str],
}

/// A browsing group of templates
#[derive(Debug, Clone)]
pub struct Theme {
    pub id: &'static str,
    pub label: &'static str,
    pub items: Vec<Template>,
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: "Countries",
        words: &[
            "France", "Brazil", "Japan", "Australia", "Canada", "Germany", "Mexico", "Italy",
            "Spain", "Argentina", "India", "China", "Russia", "Egypt", "South Africa",
            "United States", "United Kingdom", "Sweden", "Thailand", "Portugal", "Netherlands",
            "Turkey", "Nigeria", "South Korea", "New Zealand",
        ],
    },
    Category {
        name: "Cities",
        words: &[
            "New York", "London", "Paris", "Tokyo", "Berlin", "Rome", "Barcelona",
            "Los Angeles", "Chicago", "Toronto", "Sydney", "Melbourne", "Dubai", "Singapore",
            "Hong Kong", "Bangkok", "Seoul", "Amsterdam", "Vienna", "Prague", "Istanbul",
            "Athens", "Lisbon", "Rio de Janeiro", "Mexico City",
        ],
    },
    Category {
        name: "Celebrities",
        words: &[
            "Beyoncé", "Elon Musk", "Taylor Swift", "LeBron James", "Oprah Winfrey", "Tom Hanks",
            "Rihanna", "Cristiano Ronaldo", "Dwayne Johnson", "Adele", "Leonardo DiCaprio",
            "Jennifer Lopez", "Lady Gaga", "Will Smith", "Drake", "Serena Williams", "Ed Sheeran",
            "Ariana Grande", "Barack Obama", "Billie Eilish", "Lionel Messi", "Shakira", "Eminem",
        ],
    },
    Category {
        name: "Movies & TV",
        words: &[
            "The Godfather", "Titanic", "Inception", "The Lion King", "Avengers", "Breaking Bad",
            "Game of Thrones", "Friends", "The Office", "Stranger Things", "Harry Potter",
            "Star Wars", "Jurassic Park", "The Matrix", "Forrest Gump", "Pulp Fiction",
            "The Dark Knight", "Shrek", "Finding Nemo", "Avatar", "Interstellar", "Frozen",
            "Toy Story", "The Simpsons", "Black Mirror",
        ],
    },
    Category {
        name: "Animals",
        words: &[
            "Dog", "Cat", "Elephant", "Lion", "Tiger", "Giraffe", "Penguin", "Dolphin", "Shark",
            "Horse", "Wolf", "Bear", "Fox", "Monkey", "Kangaroo", "Panda", "Zebra", "Eagle", "Owl",
            "Snake", "Frog", "Turtle", "Rabbit", "Deer", "Cow",
        ],
    },
    Category {
        name: "Objects",
        words: &[
            "Chair", "Table", "Mirror", "Phone", "Wallet", "Backpack", "Watch", "Key", "Lamp",
            "Bottle", "Book", "Glasses", "Remote", "Camera", "Clock", "Pen", "Notebook",
            "Headphones", "Umbrella", "Scissors", "Shoes", "Hat", "Mug", "Charger", "Pillow",
        ],
    },
    Category {
        name: "Professions",
        words: &[
            "Doctor", "Teacher", "Chef", "Engineer", "Lawyer", "Artist", "Actor", "Musician",
            "Designer", "Photographer", "Pilot", "Flight Attendant", "Police Officer",
            "Firefighter", "Detective", "Journalist", "Programmer", "Data Scientist",
            "Product Manager", "Marketer", "Salesperson", "Entrepreneur", "Consultant",
            "Architect", "Mechanic",
        ],
    },
    Category {
        name: "Video Games",
        words: &[
            "Minecraft", "Fortnite", "Grand Theft Auto", "The Legend of Zelda", "Super Mario",
            "Pokémon", "Call of Duty", "FIFA", "The Sims", "Among Us", "League of Legends",
            "Valorant", "Counter-Strike", "World of Warcraft", "Skyrim", "Elden Ring",
            "Animal Crossing", "Rocket League", "Overwatch", "Apex Legends", "Red Dead Redemption",
            "Cyberpunk 2077", "God of War", "Hades",
        ],
    },
];

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "Famous cities",
        words: &[
            "Berlin", "Vancouver", "Copenhagen", "Helsinki", "London", "Madrid", "Oslo", "Paris",
            "Rome", "Stockholm", "Tokyo", "Reykjavik", "Dublin", "Prague", "Vienna", "Lisbon",
            "Cairo", "Bangkok", "Seoul", "Buenos Aires", "New York", "Las Vegas", "Dubai",
            "Singapore", "Sydney", "Cape Town", "Kyoto", "Istanbul", "Edinburgh", "Zermatt",
        ],
    },
    Template {
        name: "Famous landmarks",
        words: &[
            "Eiffel Tower", "Big Ben", "Colosseum", "Statue of Liberty", "Golden Gate Bridge",
            "Mount Rushmore", "Great Wall of China", "Taj Mahal", "Petra", "Angkor Wat",
            "Machu Picchu", "Christ the Redeemer", "Sydney Opera House", "Burj Khalifa",
            "Stonehenge", "Brandenburg Gate", "Empire State Building", "Sagrada Família",
            "Acropolis", "Niagara Falls",
        ],
    },
    Template {
        name: "Disney",
        words: &[
            "Mickey Mouse", "Donald Duck", "Goofy", "Elsa", "Anna", "Simba", "Ariel", "Belle",
            "Aladdin", "Genie", "Buzz Lightyear", "Woody", "Cinderella", "Snow White", "Stitch",
            "Moana", "Mulan", "Rapunzel", "Olaf", "Peter Pan", "Tinker Bell",
        ],
    },
    Template {
        name: "Animals",
        words: &[
            "Dog", "Cat", "Horse", "Rabbit", "Bear", "Wolf", "Lion", "Tiger", "Elephant",
            "Giraffe", "Zebra", "Panda", "Kangaroo", "Dolphin", "Eagle", "Shark", "Whale",
            "Penguin", "Fox", "Owl", "Monkey", "Moose",
        ],
    },
    Template {
        name: "School subjects",
        words: &[
            "Mathematics", "English", "History", "Geography", "Biology", "Chemistry", "Physics",
            "Computer Science", "Economics", "Civics", "Psychology", "Philosophy", "Art", "Music",
            "Physical Education", "Drama", "Religion", "French", "Spanish",
        ],
    },
    Template {
        name: "Sports",
        words: &[
            "Football", "Basketball", "Tennis", "Ice hockey", "Baseball", "Cricket", "Rugby",
            "Golf", "Swimming", "Volleyball", "Badminton", "Boxing", "Cycling", "Skiing",
            "Snowboarding", "Figure skating", "Bowling", "Handball", "Padel", "Ping pong",
            "Darts", "Surfing", "Judo", "Fencing", "Gymnastics", "Archery", "Chess", "E-sports",
        ],
    },
    Template {
        name: "Car brands",
        words: &[
            "Toyota", "Volkswagen", "Porsche", "BMW", "Mercedes-Benz", "Audi", "Volvo", "Ford",
            "Chevrolet", "Honda", "Hyundai", "Kia", "Nissan", "Mazda", "Tesla", "Ferrari",
            "Lamborghini", "Koenigsegg",
        ],
    },
    Template {
        name: "Popular bands",
        words: &[
            "Coldplay", "Imagine Dragons", "Maroon 5", "OneRepublic", "Red Hot Chili Peppers",
            "ABBA", "Queen", "Linkin Park", "Green Day", "U2", "The Rolling Stones", "Metallica",
            "Arctic Monkeys", "Foo Fighters", "Nirvana", "The Beatles", "Oasis", "Blink-182",
            "The Killers", "Bon Jovi",
        ],
    },
    Template {
        name: "Food & snacks",
        words: &[
            "Pizza", "Hamburger", "Hot Dog", "Kebab", "Tacos", "Burrito", "Nachos", "Fries",
            "Meatballs", "Sushi", "Lasagna", "Ramen", "Pad Thai", "Falafel", "Paella",
            "Dumplings", "Popcorn", "Chocolate", "Ice Cream", "Pancakes", "Waffles", "Donut",
            "Tiramisu", "Apple Pie", "Avocado", "Watermelon", "Milkshake", "Smoothie",
        ],
    },
];

/// Fixed themes and the template names they claim
const FIXED_THEMES: &[(&str, &str, &[&str])] = &[
    ("general", "🎲 General", &["Animals", "School subjects"]),
    ("geography", "🌍 Geography", &["Famous cities", "Famous landmarks"]),
    ("movies-and-tv", "🎬 Movies and TV", &["Disney"]),
    ("music", "🎵 Music", &["Popular bands"]),
    ("sports", "🏅 Sports", &["Sports"]),
    ("brands", "🏷️ Brands", &["Car brands"]),
];

/// Look up a built-in category by exact name
pub fn category(name: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.name == name)
}

pub fn is_builtin_category(name: &str) -> bool {
    category(name).is_some()
}

pub fn category_names() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|c| c.name)
}

/// Look up a predefined template by exact name
pub fn template(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Templates grouped for browsing, with unclaimed templates under "Other"
pub fn themes() -> Vec<Theme> {
    let mut claimed: Vec<&str> = Vec::new();
    let mut themes = Vec::with_capacity(FIXED_THEMES.len() + 1);

    for &(id, label, names) in FIXED_THEMES {
        let mut items = Vec::new();
        for &name in names {
            if claimed.contains(&name) {
                continue;
            }
            if let Some(t) = template(name) {
                claimed.push(t.name);
                items.push(*t);
            }
        }
        themes.push(Theme { id, label, items });
    }

    themes.push(Theme {
        id: "other",
        label: "🧩 Other",
        items: TEMPLATES
            .iter()
            .filter(|t| !claimed.contains(&t.name))
            .copied()
            .collect(),
    });
    themes
}
