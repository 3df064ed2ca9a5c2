pub const SUMMARY_PROMPT: &str = "You are an expert editor writing study notes for a quiz generator.

Summarize the article below in 2 to 4 complete sentences. Cover the main subject, the most important facts and why they matter. Use only information stated in the article. Do not add opinions, do not mention the article itself, and do not use bullet points.

Article title: {title}

Article content:
{content}

Respond with a single JSON object and nothing else. The object must match this JSON Schema:
{output_schema}

Example: {\"summary\": \"First sentence. Second sentence. Third sentence.\"}";

pub const ENTITIES_PROMPT: &str = "You are an information extraction system.

Identify the key named entities in the article below and group them into three categories:
- people: real or fictional persons mentioned by name
- organizations: companies, institutions, governments, teams, groups
- locations: countries, cities, regions, landmarks, geographic features

Rules:
- Only include entities that appear in the article text.
- Use the most complete form of each name that the article uses.
- List each entity once, most important first, at most 10 per category.
- Use an empty list for a category with no entities.

Article title: {title}

Article content:
{content}

Respond with a single JSON object and nothing else. The object must match this JSON Schema:
{output_schema}

Example: {\"people\": [\"Ada Lovelace\"], \"organizations\": [\"Royal Society\"], \"locations\": [\"London\"]}";

pub const QUIZ_PROMPT: &str = "You are an expert educator who writes multiple-choice quizzes that test real understanding of a text.

Write exactly {num_questions} questions about the article below.

Requirements for every question:
- It must be answerable from the article content alone.
- It has exactly 4 options. All options are distinct and plausible; only one is correct.
- \"answer\" is the letter of the correct option: A, B, C or D, matching the position in \"options\".
- \"difficulty\" is one of easy, medium or hard. Mix difficulties across the quiz.
- \"explanation\" says in one or two sentences why the answer is correct, citing the article.
- \"section_reference\" names the article section the question comes from, when known.
- Questions must not repeat each other or ask about the same fact twice.
- Spread questions across the different sections of the article.

Article title: {title}

Article content:
{content}

Respond with a single JSON object and nothing else. The object must match this JSON Schema:
{output_schema}

Example of one entry in \"quiz\":
{\"question\": \"In which year did the bridge open?\", \"options\": [\"1890\", \"1901\", \"1923\", \"1945\"], \"answer\": \"B\", \"difficulty\": \"easy\", \"explanation\": \"The article states the bridge opened in 1901.\", \"section_reference\": \"History\"}";

pub const RELATED_TOPICS_PROMPT: &str = "You are a learning advisor recommending what to read next.

Based on the article below, suggest up to 8 related topics a reader could study to deepen their understanding. Prefer specific topics, such as named events, concepts, people or places connected to the article, over generic fields of study. Do not suggest the article's own title.

Article title: {title}

Summary:
{summary}

Key entities:
{entities}

Article excerpt:
{content}

Respond with a single JSON object and nothing else. The object must match this JSON Schema:
{output_schema}

Each entry in \"related_topics\" is either a topic name string or an object {\"topic_name\": \"...\", \"url\": \"...\"} when you know a reliable reference URL.";
